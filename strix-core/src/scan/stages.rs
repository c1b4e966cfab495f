//! Per-stage tool invocations.
//!
//! Every stage follows the same contract: launch one external tool as a
//! subprocess, wait for it, read its output file back from disk and return
//! the (truncated) text. Failures never propagate out of a stage; a missing
//! binary, a missing input file or a subprocess error all degrade into a
//! diagnostic string that becomes the stage's recorded result.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::process::Command;
use tracing::{debug, warn};

use super::ScannerConfig;

const INPUT_NOT_FOUND: &str = "Error: Input file not found";

const SUBFINDER_HINT: &str = "https://github.com/projectdiscovery/subfinder";
const HTTPX_HINT: &str = "https://github.com/projectdiscovery/httpx";
const NUCLEI_HINT: &str = "https://github.com/projectdiscovery/nuclei";
const KATANA_HINT: &str = "https://github.com/projectdiscovery/katana";
const DALFOX_HINT: &str = "https://github.com/hahwul/dalfox";

/// URL path extensions with no injectable surface: stylesheets, scripts,
/// archives, media, documents and fonts crawled off static hosting.
const EXCLUDED_EXTENSIONS: &[&str] = &[
    "css", "woff", "woff2", "txt", "js", "m4r", "m4p", "m4b", "ipa", "asa", "pkg", "crash", "asf",
    "asx", "wax", "wmv", "wmx", "avi", "bmp", "class", "divx", "doc", "docx", "exe", "gif", "gz",
    "gzip", "ico", "jpg", "jpeg", "jpe", "webp", "json", "mdb", "mid", "midi", "mov", "qt", "mp3",
    "m4a", "mp4", "m4v", "mpeg", "mpg", "mpe", "webm", "mpp", "otf", "odb", "odc", "odf", "odg",
    "odp", "ods", "odt", "ogg", "pdf", "png", "pot", "pps", "ppt", "pptx", "ra", "ram", "svg",
    "svgz", "swf", "tar", "tif", "tiff", "ttf", "wav", "wma", "wri", "xla", "xls", "xlsx", "xlt",
    "xlw", "zip",
];

/// Runs individual pipeline stages against the configured external tools.
#[derive(Debug)]
pub struct StageRunner {
    config: ScannerConfig,
}

impl StageRunner {
    pub fn new(config: ScannerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Subdomain enumeration with subfinder.
    pub async fn run_subfinder(&self, domain: &str, output_file: &Path) -> String {
        let mut command = Command::new(&self.config.subfinder_path);
        command
            .arg("-d")
            .arg(domain)
            .arg("-o")
            .arg(output_file)
            .arg("-all");
        self.run_tool("subfinder", "Subfinder", SUBFINDER_HINT, command, output_file)
            .await
    }

    /// Probe enumerated hosts with httpx, keeping only the live ones.
    pub async fn run_httpx(&self, input_file: &Path, output_file: &Path) -> String {
        if !input_file.exists() {
            return INPUT_NOT_FOUND.to_string();
        }
        let mut command = Command::new(&self.config.httpx_path);
        command.arg("-l").arg(input_file).arg("-o").arg(output_file);
        self.run_tool("httpx", "Httpx", HTTPX_HINT, command, output_file)
            .await
    }

    /// Template-driven vulnerability scan with nuclei.
    pub async fn run_nuclei(&self, input_file: &Path, output_file: &Path) -> String {
        if !input_file.exists() {
            return INPUT_NOT_FOUND.to_string();
        }
        let Some(templates_dir) = self.resolve_templates_dir() else {
            return "Error: nuclei-templates directory not found".to_string();
        };
        let mut command = Command::new(&self.config.nuclei_path);
        command
            .arg("-l")
            .arg(input_file)
            .arg("-t")
            .arg(&templates_dir)
            .args(["-es", "info,low"])
            .arg("-o")
            .arg(output_file);
        self.run_tool("nuclei", "Nuclei", NUCLEI_HINT, command, output_file)
            .await
    }

    /// Crawl live hosts with katana to collect reachable URLs.
    pub async fn run_katana(&self, input_file: &Path, output_file: &Path) -> String {
        if !input_file.exists() {
            return INPUT_NOT_FOUND.to_string();
        }
        let mut command = Command::new(&self.config.katana_path);
        command
            .arg("-list")
            .arg(input_file)
            .arg("-o")
            .arg(output_file);
        self.run_tool("katana", "Katana", KATANA_HINT, command, output_file)
            .await
    }

    /// Distill crawled URLs into XSS candidates.
    ///
    /// Keeps URLs carrying query parameters, drops static-asset paths,
    /// deduplicates, optionally normalizes through uro and probes liveness
    /// with httpx. Both helpers are best-effort: when either binary is
    /// absent the filtered list flows through unchanged. The two scratch
    /// files are removed on every exit path; only `output_file` survives.
    pub async fn run_xss_discovery(&self, input_file: &Path, output_file: &Path) -> String {
        if !input_file.exists() {
            return INPUT_NOT_FOUND.to_string();
        }

        let filtered_file = append_extension(input_file, "temp");
        let probe_file = append_extension(&filtered_file, "httpx");

        let outcome = self
            .discover_candidates(input_file, &filtered_file, &probe_file, output_file)
            .await;

        for scratch in [&filtered_file, &probe_file] {
            if let Err(err) = tokio::fs::remove_file(scratch).await {
                if err.kind() != ErrorKind::NotFound {
                    warn!("failed to remove scratch file {}: {err}", scratch.display());
                }
            }
        }

        match outcome {
            Ok(()) => match tokio::fs::read_to_string(output_file).await {
                Ok(contents) => truncate_chars(contents, self.config.max_result_chars),
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    format!(
                        "XSS discovery completed. Output saved to {}",
                        output_file.display()
                    )
                }
                Err(err) => format!("Error in XSS discovery: {err}"),
            },
            Err(err) => format!("Error in XSS discovery: {err}"),
        }
    }

    async fn discover_candidates(
        &self,
        input_file: &Path,
        filtered_file: &Path,
        probe_file: &Path,
        output_file: &Path,
    ) -> std::io::Result<()> {
        let crawl_output = tokio::fs::read_to_string(input_file).await?;
        let candidates = filter_candidate_urls(&crawl_output);
        debug!(
            "xss discovery kept {} candidate urls from {}",
            candidates.len(),
            input_file.display()
        );
        tokio::fs::write(filtered_file, candidates.join("\n")).await?;

        let normalized = match Command::new(&self.config.uro_path)
            .arg("-i")
            .arg(filtered_file)
            .output()
            .await
        {
            Ok(out) if !out.stdout.is_empty() => String::from_utf8_lossy(&out.stdout).into_owned(),
            Ok(_) => candidates.join("\n"),
            Err(err) if err.kind() == ErrorKind::NotFound => candidates.join("\n"),
            Err(err) => return Err(err),
        };
        tokio::fs::write(probe_file, &normalized).await?;

        match Command::new(&self.config.httpx_path)
            .arg("-l")
            .arg(probe_file)
            .arg("-o")
            .arg(output_file)
            .output()
            .await
        {
            Ok(_) => {}
            Err(err) if err.kind() == ErrorKind::NotFound => {
                // No liveness probe available; persist the normalized list as-is.
                tokio::fs::write(output_file, &normalized).await?;
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }

    /// Active XSS testing with dalfox; its JSON report is re-serialized with
    /// stable indentation when it parses, raw otherwise.
    pub async fn run_dalfox(&self, input_file: &Path, output_file: &Path) -> String {
        if !input_file.exists() {
            return INPUT_NOT_FOUND.to_string();
        }
        let mut command = Command::new(&self.config.dalfox_path);
        command
            .arg("file")
            .arg(input_file)
            .args(["--format", "json"])
            .arg("-o")
            .arg(output_file);

        match command.output().await {
            Ok(_) => match tokio::fs::read_to_string(output_file).await {
                Ok(contents) => {
                    let rendered = serde_json::from_str::<serde_json::Value>(&contents)
                        .ok()
                        .and_then(|value| serde_json::to_string_pretty(&value).ok())
                        .unwrap_or(contents);
                    truncate_chars(rendered, self.config.max_result_chars)
                }
                Err(err) if err.kind() == ErrorKind::NotFound => {
                    format!("Dalfox completed. Output saved to {}", output_file.display())
                }
                Err(err) => format!("Error running dalfox: {err}"),
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                format!("Error: dalfox not found. Please install it: {DALFOX_HINT}")
            }
            Err(err) => format!("Error running dalfox: {err}"),
        }
    }

    async fn run_tool(
        &self,
        tool: &str,
        label: &str,
        hint: &str,
        mut command: Command,
        output_file: &Path,
    ) -> String {
        match command.output().await {
            Ok(_) => self.read_stage_output(label, tool, output_file).await,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                format!("Error: {tool} not found. Please install it: {hint}")
            }
            Err(err) => format!("Error running {tool}: {err}"),
        }
    }

    /// Exit status is deliberately ignored: these tools routinely exit
    /// nonzero after partial results, and the output file is the contract.
    async fn read_stage_output(&self, label: &str, tool: &str, output_file: &Path) -> String {
        match tokio::fs::read_to_string(output_file).await {
            Ok(contents) => truncate_chars(contents, self.config.max_result_chars),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                format!("{label} completed. Output saved to {}", output_file.display())
            }
            Err(err) => format!("Error running {tool}: {err}"),
        }
    }

    fn resolve_templates_dir(&self) -> Option<PathBuf> {
        self.config
            .nuclei_template_dirs
            .iter()
            .map(|dir| expand_home(dir))
            .find(|dir| dir.exists())
    }
}

/// Keep URLs with a query string whose path does not end in a known
/// non-interactive extension, deduplicated.
pub fn filter_candidate_urls(crawl_output: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut kept = Vec::new();
    for line in crawl_output.lines() {
        let url = line.trim();
        if url.is_empty() || !url.contains('=') {
            continue;
        }
        let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
        if EXCLUDED_EXTENSIONS
            .iter()
            .any(|ext| path.ends_with(&format!(".{ext}")))
        {
            continue;
        }
        if seen.insert(url.to_string()) {
            kept.push(url.to_string());
        }
    }
    kept
}

/// Truncate to at most `max` characters, preserving char boundaries.
pub fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text,
    }
}

fn append_extension(path: &Path, ext: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(ext);
    PathBuf::from(name)
}

fn expand_home(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = std::env::var_os("HOME") {
            return PathBuf::from(home).join(stripped);
        }
    }
    path.to_path_buf()
}
