use crate::*;
use assert_cmd::prelude::*;
use docstore::error::{Error, Result};
use docstore::storage::StorageClient;
use std::collections::HashSet;

pub fn tests(client: &StorageClient, tests: &mut Vec<Trial>) {
    tests.extend(async_trials!(
        client,
        test_allocate_slugifies_and_keeps_extension,
        test_allocate_keeps_full_extension_chain,
        test_allocate_without_extension,
        test_allocate_dotfile_uses_fallback_stem,
        test_allocate_non_latin_uses_fallback_stem,
        test_allocate_strips_client_directories,
        test_allocate_counts_up_on_collision,
        test_allocate_is_deterministic,
        test_allocate_subdir_hyphens_nest,
        test_allocate_subdir_slashes_do_not_nest,
        test_reserve_refuses_symlinked_subdir,
        test_reserve_creates_file_exclusively,
        test_reserve_concurrent_callers_get_distinct_names,
        test_allocation_gives_up_after_max_attempts
    ));

    tests.extend(async_trials!(client, e2e_alloc_command_reports_next_free_name));
}

async fn test_allocate_slugifies_and_keeps_extension(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocation = client.allocate("Rapport Final 2025.pdf", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/rapport-final-2025.pdf"));
    assert_eq!(
        allocation.absolute_path,
        client.resolver().to_absolute(&allocation.relative_path)
    );
    assert!(!allocation.absolute_path.exists());
    Ok(())
}

async fn test_allocate_keeps_full_extension_chain(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocation = client.allocate("Archive.tar.gz", Some(&dir))?;
    assert!(allocation.relative_path.ends_with("/archive.tar.gz"));
    Ok(())
}

async fn test_allocate_without_extension(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocation = client.allocate("README", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/readme"));

    let allocation = client.allocate("notes.", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/notes"));
    Ok(())
}

async fn test_allocate_dotfile_uses_fallback_stem(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocation = client.allocate(".gitignore", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/fichier.gitignore"));

    let allocation = client.allocate("!!!.csv", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/fichier.csv"));

    let allocation = client.allocate("", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/fichier"));
    Ok(())
}

async fn test_allocate_non_latin_uses_fallback_stem(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocation = client.allocate("報告書.pdf", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/fichier.pdf"));

    let allocation = client.allocate("Ô Zã!!.csv", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/o-za.csv"));
    Ok(())
}

async fn test_allocate_strips_client_directories(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocation = client.allocate("C:\\Users\\ana\\Devis Signé.pdf", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/devis-signe.pdf"));

    let allocation = client.allocate("../../etc/passwd", Some(&dir))?;
    assert_eq!(allocation.relative_path, format!("{dir}/passwd"));
    Ok(())
}

async fn test_allocate_counts_up_on_collision(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();

    write_stored(&client, &format!("{dir}/rapport-final.pdf"), b"v1");
    let second = client.allocate("Rapport Final.pdf", Some(&dir))?;
    assert_eq!(second.relative_path, format!("{dir}/rapport-final-2.pdf"));

    write_stored(&client, &second.relative_path, b"v2");
    let third = client.allocate("Rapport Final.pdf", Some(&dir))?;
    assert_eq!(third.relative_path, format!("{dir}/rapport-final-3.pdf"));
    Ok(())
}

async fn test_allocate_is_deterministic(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    write_stored(&client, &format!("{dir}/budget.xlsx"), b"x");

    let first = client.allocate("Budget.xlsx", Some(&dir))?;
    let second = client.allocate("Budget.xlsx", Some(&dir))?;
    assert_eq!(first, second);
    assert!(!first.absolute_path.exists());
    Ok(())
}

async fn test_allocate_subdir_hyphens_nest(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocation = client.allocate("Contrat.pdf", Some(&format!("{dir} Rapports 2025")))?;
    assert_eq!(allocation.relative_path, format!("{dir}/rapports/2025/contrat.pdf"));

    Ok(())
}

// Only the last segment of a slash-separated label is kept.
async fn test_allocate_subdir_slashes_do_not_nest(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocation = client.allocate("Contrat.pdf", Some(&format!("Marchés/{dir}")))?;
    assert_eq!(allocation.relative_path, format!("{dir}/contrat.pdf"));

    let allocation = client.allocate("Contrat.pdf", Some(&format!("{dir}/Marchés")))?;
    assert_eq!(allocation.relative_path, "marches/contrat.pdf");
    Ok(())
}

async fn test_reserve_creates_file_exclusively(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocator = client.allocator();

    let (first, _file) = allocator.reserve("Note de service.docx", Some(&dir))?.into_parts();
    assert_eq!(first.relative_path, format!("{dir}/note-de-service.docx"));
    assert!(first.absolute_path.is_file());

    let (second, _file) = allocator.reserve("Note de service.docx", Some(&dir))?.into_parts();
    assert_eq!(second.relative_path, format!("{dir}/note-de-service-2.docx"));
    assert!(second.absolute_path.is_file());
    Ok(())
}

// A subdirectory that is a symlink out of the root must not get anything
// created beneath its target.
async fn test_reserve_refuses_symlinked_subdir(client: StorageClient) -> Result<()> {
    #[cfg(unix)]
    {
        let outside = TEST_FIXTURE.new_local_dir();
        let dir = TEST_FIXTURE.new_dir_label();
        let link = client.resolver().to_absolute(&dir);
        std::os::unix::fs::symlink(&outside, &link)?;

        let err = client
            .allocator()
            .reserve("Contrat.pdf", Some(&format!("{dir} annexes")))
            .unwrap_err();
        assert!(matches!(err, Error::PathOutsideRoot { .. }));
        assert!(!outside.join("annexes").exists());

        let err = client
            .allocator()
            .reserve("Contrat.pdf", Some(&dir))
            .unwrap_err();
        assert!(matches!(err, Error::PathOutsideRoot { .. }));
        assert!(!outside.join("contrat.pdf").exists());
    }
    Ok(())
}

async fn test_reserve_concurrent_callers_get_distinct_names(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocator = client.allocator();

    let names: Vec<String> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    allocator
                        .reserve("Photo.jpg", Some(&dir))
                        .map(|reservation| reservation.allocation.relative_path)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Result<Vec<_>>>()
    })?;

    let unique: HashSet<_> = names.iter().collect();
    assert_eq!(unique.len(), names.len());
    for attempt in 2..=8 {
        assert!(names.contains(&format!("{dir}/photo-{attempt}.jpg")));
    }
    assert!(names.contains(&format!("{dir}/photo.jpg")));
    Ok(())
}

async fn test_allocation_gives_up_after_max_attempts(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    let allocator = client.allocator().clone().with_max_attempts(2);

    write_stored(&client, &format!("{dir}/plan.pdf"), b"1");
    write_stored(&client, &format!("{dir}/plan-2.pdf"), b"2");

    let err = allocator.next_available("Plan.pdf", Some(&dir)).unwrap_err();
    assert!(matches!(err, Error::AllocationExhausted { attempts: 2, .. }));

    let err = allocator.reserve("Plan.pdf", Some(&dir)).unwrap_err();
    assert!(matches!(err, Error::AllocationExhausted { .. }));
    Ok(())
}

async fn e2e_alloc_command_reports_next_free_name(client: StorageClient) -> Result<()> {
    let dir = TEST_FIXTURE.new_dir_label();
    write_stored(&client, &format!("{dir}/rapport-final.pdf"), b"v1");

    let assert = docstore_cmd()
        .arg("alloc")
        .arg("Rapport Final.pdf")
        .arg("--subdir")
        .arg(&dir)
        .arg("--json")
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&assert.get_output().stdout)?;
    assert_eq!(value["relative_path"], format!("{dir}/rapport-final-2.pdf"));
    assert_eq!(value["url"], format!("/media/{dir}/rapport-final-2.pdf"));

    // Previewing must not create anything.
    assert!(!client
        .resolver()
        .to_absolute(&format!("{dir}/rapport-final-2.pdf"))
        .exists());
    Ok(())
}
