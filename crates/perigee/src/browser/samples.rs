//! Sample bank browser.
//!
//! Audio files under the samples root are grouped into banks by their
//! parent directory, the way the audio engine names them: the third file
//! of `bd/` is `bd:2`. The tree is scanned on a worker thread the first
//! time the browser opens; the event loop picks the result up with
//! [`SampleBrowser::poll_scan`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::event::{KeyCode, KeyEvent};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::{move_selection, ViewAction};

const AUDIO_EXTENSIONS: [&str; 6] = ["wav", "mp3", "flac", "ogg", "aiff", "aif"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEntry {
    /// `bank:index` as used in patterns.
    pub reference: String,
    pub kind: String,
    pub size: String,
    pub name: String,
    pub path: PathBuf,
}

pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    match size {
        s if s < KB => format!("{s} B"),
        s if s < MB => format!("{:.1} KB", s as f64 / KB as f64),
        s if s < GB => format!("{:.1} MB", s as f64 / MB as f64),
        s => format!("{:.1} GB", s as f64 / GB as f64),
    }
}

fn audio_kind(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    if !AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        return None;
    }
    Some(match ext.as_str() {
        "aif" => "AIFF".to_string(),
        other => other.to_ascii_uppercase(),
    })
}

/// Walk `root` and return every audio file as a bank entry, banks in name
/// order and files sorted case-insensitively within each bank.
pub fn scan_samples(root: &Path) -> Vec<SampleEntry> {
    let mut banks: BTreeMap<String, Vec<(String, String, u64, PathBuf)>> = BTreeMap::new();

    for entry in WalkDir::new(root).into_iter().filter_map(|entry| match entry {
        Ok(entry) => Some(entry),
        Err(err) => {
            warn!("skipping unreadable sample path: {err}");
            None
        }
    }) {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        let Some(kind) = audio_kind(path) else {
            continue;
        };
        let bank = path
            .parent()
            .and_then(Path::file_name)
            .map(|bank| bank.to_string_lossy().to_string())
            .unwrap_or_default();
        let size = entry.metadata().map(|meta| meta.len()).unwrap_or(0);
        banks
            .entry(bank)
            .or_default()
            .push((name, kind, size, path.to_path_buf()));
    }

    let mut samples = Vec::new();
    for (bank, mut files) in banks {
        files.sort_by_key(|(name, ..)| name.to_lowercase());
        for (idx, (name, kind, size, path)) in files.into_iter().enumerate() {
            samples.push(SampleEntry {
                reference: format!("{bank}:{idx}"),
                kind,
                size: format_size(size),
                name,
                path,
            });
        }
    }
    samples
}

#[derive(Debug, Clone)]
enum ScanState {
    Idle,
    Scanning(Receiver<Vec<SampleEntry>>),
    Loaded,
}

#[derive(Debug, Clone)]
pub struct SampleBrowser {
    root: PathBuf,
    scan: ScanState,
    samples: Vec<SampleEntry>,
    /// Indices into `samples` matching the filter.
    visible: Vec<usize>,
    selected: usize,
    query: String,
    filtering: bool,
}

impl SampleBrowser {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            scan: ScanState::Idle,
            samples: Vec::new(),
            visible: Vec::new(),
            selected: 0,
            query: String::new(),
            filtering: false,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Start scanning the root in the background unless a scan already
    /// ran or is running.
    pub fn ensure_loaded(&mut self) {
        if !matches!(self.scan, ScanState::Idle) {
            return;
        }
        let (tx, rx) = crossbeam_channel::bounded(1);
        let root = self.root.clone();
        let spawned = thread::Builder::new()
            .name("sample-scan".to_string())
            .spawn(move || {
                let samples = scan_samples(&root);
                if tx.send(samples).is_err() {
                    debug!("sample scan finished after the browser went away");
                }
            });
        match spawned {
            Ok(_) => self.scan = ScanState::Scanning(rx),
            Err(err) => {
                warn!("failed to spawn sample scan, scanning inline: {err}");
                let samples = scan_samples(&self.root);
                self.finish_scan(samples);
            }
        }
    }

    /// Take a finished scan, if one is waiting. Returns true when the
    /// sample list changed.
    pub fn poll_scan(&mut self) -> bool {
        let ScanState::Scanning(rx) = &self.scan else {
            return false;
        };
        match rx.try_recv() {
            Ok(samples) => {
                self.finish_scan(samples);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                warn!("sample scan of {} ended without a result", self.root.display());
                self.finish_scan(Vec::new());
                true
            }
        }
    }

    pub fn is_scanning(&self) -> bool {
        matches!(self.scan, ScanState::Scanning(_))
    }

    fn finish_scan(&mut self, samples: Vec<SampleEntry>) {
        self.samples = samples;
        self.scan = ScanState::Loaded;
        info!(
            "loaded {} samples from {}",
            self.samples.len(),
            self.root.display()
        );
        self.apply_filter();
    }

    pub fn is_filtering(&self) -> bool {
        self.filtering
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn visible(&self) -> impl Iterator<Item = &SampleEntry> {
        self.visible.iter().filter_map(|idx| self.samples.get(*idx))
    }

    pub fn visible_len(&self) -> usize {
        self.visible.len()
    }

    fn apply_filter(&mut self) {
        let query = self.query.to_lowercase();
        self.visible = self
            .samples
            .iter()
            .enumerate()
            .filter(|(_, sample)| query.is_empty() || sample.reference.to_lowercase().contains(&query))
            .map(|(idx, _)| idx)
            .collect();
        self.selected = self.selected.min(self.visible.len().saturating_sub(1));
    }

    fn selected_sample(&self) -> Option<&SampleEntry> {
        self.visible
            .get(self.selected)
            .and_then(|idx| self.samples.get(*idx))
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
        if self.filtering {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.filtering = false,
                KeyCode::Backspace => {
                    self.query.pop();
                    self.apply_filter();
                }
                KeyCode::Char(ch) => {
                    self.query.push(ch);
                    self.apply_filter();
                }
                _ => {}
            }
            return ViewAction::None;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => ViewAction::Close,
            KeyCode::Char('/') => {
                self.filtering = true;
                ViewAction::None
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = move_selection(self.selected, self.visible.len(), -1);
                ViewAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = move_selection(self.selected, self.visible.len(), 1);
                ViewAction::None
            }
            KeyCode::Char('g') => {
                self.selected = 0;
                ViewAction::None
            }
            KeyCode::Enter | KeyCode::Char(' ') => self
                .selected_sample()
                .map_or(ViewAction::None, |sample| {
                    ViewAction::PlaySample(sample.path.clone())
                }),
            _ => ViewAction::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{format_size, scan_samples, SampleBrowser};
    use crate::browser::ViewAction;
    use crate::test_utils::key;
    use crossterm::event::KeyCode;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use std::thread;
    use std::time::Duration;
    use tempfile::TempDir;

    fn load(browser: &mut SampleBrowser) {
        browser.ensure_loaded();
        for _ in 0..500 {
            if browser.poll_scan() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("sample scan never finished");
    }

    fn write(root: &Path, rel: &str, bytes: usize) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, vec![0u8; bytes]).expect("write sample");
    }

    fn fixture() -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "bd/BT0A0D0.wav", 2048);
        write(dir.path(), "bd/BT0A0A7.wav", 10);
        write(dir.path(), "hh/000_hh3closedhh.wav", 10);
        write(dir.path(), "hh/readme.txt", 10);
        write(dir.path(), "hh/.DS_Store", 10);
        write(dir.path(), "superpiano/c4.FLAC", 10);
        dir
    }

    #[test]
    fn format_size_picks_units() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024 + 512 * 1024), "3.5 MB");
        assert_eq!(format_size(2 * 1024 * 1024 * 1024), "2.0 GB");
    }

    #[test]
    fn scan_groups_audio_files_into_banks() {
        let dir = fixture();
        let refs: Vec<(String, String)> = scan_samples(dir.path())
            .into_iter()
            .map(|sample| (sample.reference, sample.name))
            .collect();
        assert_eq!(
            refs,
            vec![
                ("bd:0".to_string(), "BT0A0A7.wav".to_string()),
                ("bd:1".to_string(), "BT0A0D0.wav".to_string()),
                ("hh:0".to_string(), "000_hh3closedhh.wav".to_string()),
                ("superpiano:0".to_string(), "c4.FLAC".to_string()),
            ]
        );
    }

    #[test]
    fn missing_root_scans_empty() {
        let dir = TempDir::new().expect("temp dir");
        assert!(scan_samples(&dir.path().join("missing")).is_empty());
    }

    #[test]
    fn filter_narrows_by_reference_and_enter_plays() {
        let dir = fixture();
        let mut browser = SampleBrowser::new(dir.path().to_path_buf());
        load(&mut browser);
        assert_eq!(browser.visible_len(), 4);

        browser.handle_key(key(KeyCode::Char('/')));
        assert!(browser.is_filtering());
        for ch in "hh".chars() {
            browser.handle_key(key(KeyCode::Char(ch)));
        }
        browser.handle_key(key(KeyCode::Enter));
        assert!(!browser.is_filtering());
        assert_eq!(browser.visible_len(), 1);

        assert_eq!(
            browser.handle_key(key(KeyCode::Enter)),
            ViewAction::PlaySample(dir.path().join("hh").join("000_hh3closedhh.wav"))
        );
        assert_eq!(browser.handle_key(key(KeyCode::Char('q'))), ViewAction::Close);
    }

    #[test]
    fn scan_runs_in_background_and_only_once() {
        let dir = fixture();
        let mut browser = SampleBrowser::new(dir.path().to_path_buf());
        assert!(!browser.is_scanning());
        assert!(!browser.poll_scan());

        browser.ensure_loaded();
        assert!(browser.is_scanning());
        assert_eq!(browser.visible_len(), 0);
        load(&mut browser);
        assert!(!browser.is_scanning());
        assert_eq!(browser.visible_len(), 4);

        // A finished scan is not repeated.
        write(dir.path(), "sn/ST0T0S0.wav", 10);
        browser.ensure_loaded();
        assert!(!browser.is_scanning());
        assert!(!browser.poll_scan());
        assert_eq!(browser.visible_len(), 4);
    }
}
