//! `tessera build`: one pass of setup, extract, emit and write.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tessera_builder::{Builder, CssRoot, ProjectHost};

use crate::{BuildArgs, GlobalArgs};

/// Creates a builder for the project under `global.cwd`.
pub fn project_builder(global: &GlobalArgs) -> Builder<ProjectHost> {
    let builder = Builder::new(ProjectHost::new(), &global.cwd);
    match &global.config {
        Some(config) => builder.with_config_path(absolute(&global.cwd, config)),
        None => builder,
    }
}

/// Runs the `tessera build` command.
///
/// Returns exit code 0 when every source file extracted, 1 otherwise. The
/// stylesheet is still written when some files fail.
pub async fn run(args: &BuildArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let mut builder = project_builder(global);
    builder.setup().await?;

    if !global.quiet {
        if let Some(config_path) = builder.config_path() {
            eprintln!("    Config {}", config_path.display());
        }
        if global.verbose {
            if let Some(id) = builder.context_id() {
                eprintln!("   Context {id} (changed: {})", builder.config_changed());
            }
        }
    }

    let summary = builder.extract().await?;
    builder.emit().await?;
    if !global.quiet {
        eprintln!(
            "  Extracted {} of {} files ({} unchanged, {} empty)",
            summary.extracted, summary.scanned, summary.unchanged, summary.empty
        );
    }
    for (path, error) in &summary.failed {
        eprintln!("error: {}: {error}", path.display());
    }

    match &args.outfile {
        Some(outfile) => {
            let outfile = absolute(&global.cwd, outfile);
            let existing = read_existing(&outfile)?;
            let mut root = CssRoot::parse(&existing);
            builder.write(&mut root)?;
            if let Some(parent) = outfile.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&outfile, root.to_css())?;
            tracing::debug!(path = %outfile.display(), "stylesheet written");
            if !global.quiet {
                eprintln!("     Wrote {}", outfile.display());
            }
        }
        None => print!("{}", builder.to_css()?),
    }

    if summary.is_success() {
        Ok(0)
    } else {
        if !global.quiet {
            eprintln!("    Failed {} file(s)", summary.failed.len());
        }
        Ok(1)
    }
}

fn read_existing(path: &Path) -> std::io::Result<String> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e),
    }
}

fn absolute(cwd: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[project]
name = "demo"
include = ["src/**/*.json"]
"#;

    fn global(cwd: &Path) -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
            cwd: cwd.to_path_buf(),
        }
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tessera.toml"), CONFIG).unwrap();
        std::fs::create_dir_all(dir.path().join("src")).unwrap();
        std::fs::write(
            dir.path().join("src/app.json"),
            r#"{ "css": [{ "p": 4 }] }"#,
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn build_writes_outfile() {
        let dir = project();
        let args = BuildArgs {
            outfile: Some(PathBuf::from("dist/styles.css")),
        };
        let code = run(&args, &global(dir.path())).await.unwrap();
        assert_eq!(code, 0);
        let written = std::fs::read_to_string(dir.path().join("dist/styles.css")).unwrap();
        assert!(written.contains(".p_4 { padding: 4; }"));
    }

    #[tokio::test]
    async fn build_keeps_existing_rules() {
        let dir = project();
        let outfile = dir.path().join("styles.css");
        std::fs::write(&outfile, "body { margin: 0; }\n").unwrap();
        let args = BuildArgs {
            outfile: Some(outfile.clone()),
        };
        run(&args, &global(dir.path())).await.unwrap();
        let written = std::fs::read_to_string(&outfile).unwrap();
        assert!(written.contains("body { margin: 0; }"));
        assert!(written.contains(".p_4 { padding: 4; }"));
    }

    #[tokio::test]
    async fn build_reports_failed_files() {
        let dir = project();
        std::fs::write(dir.path().join("src/bad.json"), "{").unwrap();
        let args = BuildArgs {
            outfile: Some(PathBuf::from("out.css")),
        };
        let code = run(&args, &global(dir.path())).await.unwrap();
        assert_eq!(code, 1);
        assert!(dir.path().join("out.css").is_file());
    }

    #[tokio::test]
    async fn build_without_config_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = BuildArgs { outfile: None };
        let err = run(&args, &global(dir.path())).await.unwrap_err();
        assert!(err.to_string().contains("tessera.toml"));
    }

    #[tokio::test]
    async fn explicit_config_is_resolved_against_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("web")).unwrap();
        std::fs::write(dir.path().join("web/tessera.toml"), CONFIG).unwrap();
        let mut args = global(dir.path());
        args.config = Some(PathBuf::from("web/tessera.toml"));

        let mut builder = project_builder(&args);
        builder.setup().await.unwrap();
        assert_eq!(
            builder.config_path(),
            Some(dir.path().join("web/tessera.toml").as_path())
        );
    }
}
