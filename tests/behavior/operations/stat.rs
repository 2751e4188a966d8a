use crate::*;
use assert_cmd::prelude::*;
use docstore::error::Result;
use docstore::storage::StorageClient;
use predicates::prelude::*;

pub fn tests(client: &StorageClient, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        client,
        test_stat_client_reports_url,
        test_stat_file_human,
        test_stat_file_json,
        test_stat_dir_raw,
        test_stat_not_found,
        test_stat_outside_root
    ));
}

pub async fn test_stat_client_reports_url(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let relative = format!("{dir}/fiche.pdf");
    write_stored(&client, &relative, b"0123456789");

    let meta = client.stat(&format!("/storage/{relative}")).await?;
    assert_eq!(meta.path, relative);
    assert_eq!(meta.entry_type, "file");
    assert_eq!(meta.size, 10);
    assert_eq!(meta.url, format!("/media/{relative}"));
    Ok(())
}

pub async fn test_stat_file_human(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let relative = format!("{dir}/fiche.pdf");
    write_stored(&client, &relative, &TEST_FIXTURE.new_content(1..1024));

    docstore_cmd()
        .arg("stat")
        .arg(&relative)
        .assert()
        .success()
        .stdout(predicate::str::contains("type=file"))
        .stdout(predicate::str::contains("size="));
    Ok(())
}

pub async fn test_stat_file_json(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let relative = format!("{dir}/fiche.pdf");
    write_stored(&client, &relative, b"abc");

    docstore_cmd()
        .arg("stat")
        .arg(&relative)
        .arg("--json")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"))
        .stdout(predicate::str::contains("\"entry_type\":\"file\""))
        .stdout(predicate::str::contains(format!(
            "\"url\":\"/media/{relative}\""
        )));
    Ok(())
}

pub async fn test_stat_dir_raw(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    write_stored(&client, &format!("{dir}/inner.txt"), b"x");

    docstore_cmd()
        .arg("stat")
        .arg(format!("/{dir}"))
        .arg("--raw")
        .assert()
        .success()
        .stdout(predicate::str::contains("type=dir"))
        .stdout(predicate::str::contains(format!("path={dir}\n")));
    Ok(())
}

pub async fn test_stat_not_found(_client: StorageClient) -> Result<()> {
    docstore_cmd()
        .arg("stat")
        .arg("/no_such_file")
        .assert()
        .failure();
    Ok(())
}

pub async fn test_stat_outside_root(_client: StorageClient) -> Result<()> {
    docstore_cmd()
        .arg("stat")
        .arg("../")
        .assert()
        .failure()
        .stderr(predicate::str::contains("escapes the storage root"));
    Ok(())
}
