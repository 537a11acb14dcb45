//! `tessera deps`: lists what a file watcher should track.

use tessera_builder::DependencyMessage;

use crate::build::project_builder;
use crate::GlobalArgs;

/// Runs the `tessera deps` command.
///
/// Prints one line per dependency: `file <path>` or `dir <path> <glob>`.
pub async fn run(global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let lines = collect(global).await?;
    for line in &lines {
        println!("{line}");
    }
    if !global.quiet {
        eprintln!("   Tracking {} dependencies", lines.len());
    }
    Ok(0)
}

async fn collect(global: &GlobalArgs) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut builder = project_builder(global);
    builder.setup().await?;
    let mut lines = Vec::new();
    builder.register_dependency(|message| lines.push(format_message(&message)))?;
    Ok(lines)
}

fn format_message(message: &DependencyMessage) -> String {
    match message {
        DependencyMessage::Dependency { file } => format!("file {}", file.display()),
        DependencyMessage::DirDependency { dir, glob } => {
            format!("dir {} {glob}", dir.display())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn format_file_and_dir() {
        let file = DependencyMessage::Dependency {
            file: PathBuf::from("/p/tessera.toml"),
        };
        assert_eq!(format_message(&file), "file /p/tessera.toml");

        let dir = DependencyMessage::DirDependency {
            dir: PathBuf::from("/p/src"),
            glob: "**/*.json".to_string(),
        };
        assert_eq!(format_message(&dir), "dir /p/src **/*.json");
    }

    #[tokio::test]
    async fn lists_include_and_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tessera.toml"),
            "[project]\nname = \"demo\"\ninclude = [\"src/**/*.json\"]\n",
        )
        .unwrap();
        let global = GlobalArgs {
            quiet: true,
            verbose: false,
            config: None,
            cwd: dir.path().to_path_buf(),
        };

        let lines = collect(&global).await.unwrap();
        let src = dir.path().join("src");
        let config = dir.path().join("tessera.toml");
        assert!(lines.contains(&format!("dir {} **/*.json", src.display())));
        assert!(lines.contains(&format!("file {}", config.display())));
    }
}
