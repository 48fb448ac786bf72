use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::default_data_dir;
use crate::model::task::Task;
use crate::repository::slot;
use crate::repository::traits::TaskRepository;

const DEFAULT_FILE_NAME: &str = "tasks.json";

#[derive(Clone)]
pub struct FileTaskRepository {
    file_path: PathBuf,
}

impl FileTaskRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path)?; // Ensure the directory exists
        path.push(DEFAULT_FILE_NAME);

        Ok(FileTaskRepository { file_path: path })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }
}

impl TaskRepository for FileTaskRepository {
    fn load_all(&self) -> Vec<Task> {
        let text = match fs::read_to_string(&self.file_path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("cannot read {}: {e}", self.file_path.display());
                return Vec::new();
            }
        };

        let tasks = slot::decode_or_empty(&text, &self.file_path.display().to_string());
        debug!("loaded {} tasks from {}", tasks.len(), self.file_path.display());
        tasks
    }

    fn save_all(&self, tasks: &[Task]) -> Result<()> {
        let text = slot::encode(tasks)?;
        let file = File::create(&self.file_path)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
        Ok(())
    }
}
