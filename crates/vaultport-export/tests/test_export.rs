//! End-to-end export runs against real vault fixtures on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vaultport_core::{Error, ExportConfig, Result};
use vaultport_export::export_vault;
use vaultport_vault::{index_vault, open_vault};

struct Fixture {
    _dir: TempDir,
    config: ExportConfig,
}

impl Fixture {
    fn new(notes: &[(&str, &str)]) -> Self {
        let dir = TempDir::new().unwrap();
        let vault_dir = dir.path().join("vault");

        fs::create_dir_all(vault_dir.join(".obsidian")).unwrap();
        fs::write(vault_dir.join(".obsidian/app.json"), "{}").unwrap();

        for (vault_path, content) in notes {
            let fs_path = vault_dir.join(vault_path.trim_start_matches('/'));
            fs::create_dir_all(fs_path.parent().unwrap()).unwrap();
            fs::write(&fs_path, content).unwrap();
        }

        let mut config = ExportConfig::new(vault_dir);
        config.site_dir = dir.path().join("site");

        Self { _dir: dir, config }
    }

    async fn export(&self) -> Result<vaultport_export::ExportReport> {
        let vault = open_vault(&self.config)?;
        let files = index_vault(&vault, &self.config.ignore)?;
        export_vault(&self.config, &vault, &files).await
    }

    fn content_path(&self, rel: &str) -> PathBuf {
        self.config.content_dir().join(rel)
    }

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }
}

#[tokio::test]
async fn test_exports_all_file_kinds() {
    let fixture = Fixture::new(&[
        ("/Root note.md", "See [[other]]."),
        ("/folder/other.md", "Linked content."),
        ("/folder/An image.png", "fake-png"),
        ("/Some file.pdf", "fake-pdf"),
    ]);

    let report = fixture.export().await.unwrap();

    assert_eq!(report.pages, 2);
    assert_eq!(report.assets, 1);
    assert_eq!(report.files, 1);
    assert_eq!(report.skipped, 0);

    let page = Fixture::read(&fixture.content_path("Root-note.md"));
    assert!(page.contains("title: Root note"));
    assert!(page.contains("[other](/notes/folder/other)"));

    assert!(fixture.content_path("folder/other.md").is_file());
    assert!(fixture
        .config
        .assets_dir()
        .join("folder/an-image.png")
        .is_file());
    assert!(fixture.config.public_dir().join("some-file.pdf").is_file());
}

#[tokio::test]
async fn test_unpublished_note_is_not_written() {
    let fixture = Fixture::new(&[
        ("/visible.md", "Shown."),
        ("/hidden.md", "---\npublish: false\n---\nNot shown."),
    ]);

    let report = fixture.export().await.unwrap();

    assert_eq!(report.pages, 1);
    assert_eq!(report.skipped, 1);
    assert!(fixture.content_path("visible.md").is_file());
    assert!(!fixture.content_path("hidden.md").exists());
}

#[tokio::test]
async fn test_alias_redirect_stub() {
    let fixture = Fixture::new(&[(
        "/folder/My Note.md",
        "---\naliases:\n  - old name\n---\nBody.",
    )]);

    let report = fixture.export().await.unwrap();
    assert_eq!(report.aliases, 1);

    let stub_path = fixture.config.public_dir().join("folder/old-name/index.html");
    let stub = Fixture::read(&stub_path);

    assert!(stub.contains("<title>My Note</title>"));
    assert!(stub.contains(r#"content="0;url=/notes/folder/My-Note""#));
    assert!(stub.contains(r#"<link rel="canonical" href="/notes/folder/My-Note">"#));
}

#[tokio::test]
async fn test_component_page_gets_mdx_extension() {
    let fixture = Fixture::new(&[(
        "/video.md",
        "![](https://www.youtube.com/watch?v=sYe8fW05-_4)",
    )]);

    fixture.export().await.unwrap();

    let page = Fixture::read(&fixture.content_path("video.mdx"));
    assert!(page.contains("import Youtube from 'vaultport/components/Youtube.astro'"));
    assert!(page.contains("<Youtube id=\"sYe8fW05-_4\" />"));
}

#[tokio::test]
async fn test_failures_reported_after_all_files_attempted() {
    let fixture = Fixture::new(&[("/good.md", "Fine."), ("/bad.md", "Doomed.")]);

    let vault = open_vault(&fixture.config).unwrap();
    let files = index_vault(&vault, &fixture.config.ignore).unwrap();

    // Make one note unreadable between indexing and export.
    let bad = files.iter().find(|f| f.vault_path == "/bad.md").unwrap();
    fs::remove_file(&bad.fs_path).unwrap();

    let error = export_vault(&fixture.config, &vault, &files)
        .await
        .unwrap_err();

    match error {
        Error::ExportFailed { failures } => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].vault_path, "/bad.md");
        }
        other => panic!("expected ExportFailed, got {other}"),
    }

    // The healthy note was still exported.
    assert!(fixture.content_path("good.md").is_file());
}

#[tokio::test]
async fn test_previous_output_is_cleared() {
    let fixture = Fixture::new(&[("/note.md", "Current.")]);

    let stale = fixture.content_path("deleted-long-ago.md");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, "stale").unwrap();

    fixture.export().await.unwrap();

    assert!(!stale.exists());
    assert!(fixture.content_path("note.md").is_file());
}
