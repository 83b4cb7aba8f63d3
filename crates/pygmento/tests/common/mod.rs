pub mod fixtures;

use assert_cmd::Command;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use fixtures::{CONTEXT_JSON, MINIMAL_CONFIG, MINIMAL_TEMPLATES};

pub struct TestEnvironment {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl TestEnvironment {
    pub fn minimal() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path().to_path_buf();

        let env = Self { temp_dir, root };
        env.setup_minimal();
        env
    }

    fn setup_minimal(&self) {
        self.create_dir("templates");

        self.write_file("pygmento.yaml", MINIMAL_CONFIG);
        self.write_file("context.json", CONTEXT_JSON);

        for (name, content) in MINIMAL_TEMPLATES.iter() {
            self.write_file(&format!("templates/{}", name), content);
        }
    }

    pub fn create_dir(&self, path: &str) {
        fs::create_dir_all(self.root.join(path)).expect("Failed to create directory");
    }

    pub fn write_file(&self, path: &str, content: &str) {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        fs::write(full_path, content).expect("Failed to write file");
    }

    pub fn read_file(&self, path: &str) -> String {
        fs::read_to_string(self.root.join(path)).expect("Failed to read file")
    }

    pub fn file_exists(&self, path: &str) -> bool {
        self.root.join(path).exists()
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("pygmento").expect("Failed to find pygmento binary");
        cmd.current_dir(&self.root)
            .env_remove("PYGMENTO_STYLE")
            .env_remove("PYGMENTO_CSS_CLASS");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> std::process::Output {
        self.command()
            .args(args)
            .output()
            .expect("Failed to execute pygmento")
    }

    pub fn run_render(&self, name: &str) -> std::process::Output {
        self.run(&["render", name, "--context", "context.json"])
    }
}

pub fn assert_success(output: &std::process::Output) {
    if !output.status.success() {
        eprintln!("STDOUT: {}", String::from_utf8_lossy(&output.stdout));
        eprintln!("STDERR: {}", String::from_utf8_lossy(&output.stderr));
        panic!("Command failed with status: {:?}", output.status);
    }
}

pub fn assert_failure(output: &std::process::Output) {
    assert!(
        !output.status.success(),
        "Expected command to fail but it succeeded"
    );
}

pub fn stdout(output: &std::process::Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stdout_contains(output: &std::process::Output, text: &str) -> bool {
    stdout(output).contains(text)
}

pub fn stderr_contains(output: &std::process::Output, text: &str) -> bool {
    String::from_utf8_lossy(&output.stderr).contains(text)
}
