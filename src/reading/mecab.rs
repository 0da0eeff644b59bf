use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, warn};

use super::{Analyzer, Token};
use crate::config::MecabConfig;

static NODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(.+)\[(.*)\]$").expect("valid regex"));

/// Analyzer backed by a long-running `mecab` child process.
///
/// The process is started on first use. When a request fails the process is
/// dropped and the next request starts a fresh one.
pub struct MecabAnalyzer {
    config: MecabConfig,
    process: Option<MecabProcess>,
}

struct MecabProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl MecabProcess {
    fn spawn(config: &MecabConfig) -> Result<Self> {
        let mut child = Command::new(&config.program)
            .args(config.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to start mecab at {:?}", config.program))?;

        let stdin = child.stdin.take().context("mecab stdin was not piped")?;
        let stdout = child.stdout.take().context("mecab stdout was not piped")?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    fn request(&mut self, line: &str) -> Result<String> {
        writeln!(self.stdin, "{line}").context("Failed to write to mecab")?;
        self.stdin.flush().context("Failed to flush mecab input")?;

        let mut response = String::new();
        let read = self
            .stdout
            .read_line(&mut response)
            .context("Failed to read from mecab")?;
        if read == 0 {
            return Err(anyhow!("mecab closed its output"));
        }

        Ok(response.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl Drop for MecabProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl MecabAnalyzer {
    pub fn new(config: MecabConfig) -> Self {
        Self {
            config,
            process: None,
        }
    }

    fn ensure_open(&mut self) -> Result<&mut MecabProcess> {
        if self.process.is_none() {
            debug!(program = ?self.config.program, "starting mecab");
            self.process = Some(MecabProcess::spawn(&self.config)?);
        }

        self.process
            .as_mut()
            .context("mecab process missing after start")
    }
}

impl Analyzer for MecabAnalyzer {
    fn analyze(&mut self, text: &str) -> Result<Vec<Token>> {
        let line = text.replace(['\r', '\n'], " ");

        let result = self.ensure_open()?.request(&line);
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!("mecab request failed, restarting on next use: {err:#}");
                self.process = None;
                return Err(err);
            }
        };

        parse_nodes(&response)
    }
}

/// Parses one line of `surface[reading] ` nodes.
///
/// Parsing stops at the first empty node, which is where the trailing
/// separator leaves off.
pub fn parse_nodes(line: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    for node in line.split(' ') {
        if node.is_empty() {
            break;
        }

        let caps = NODE
            .captures(node)
            .ok_or_else(|| anyhow!("Malformed mecab node: {node:?}"))?;
        // ipadic prints `*` for features it does not know
        let reading = match &caps[2] {
            "*" => "",
            reading => reading,
        };

        tokens.push(Token::new(&caps[1], reading));
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_node_format() {
        let tokens = parse_nodes("昨日[キノウ] 、[、] 林檎[リンゴ] を[ヲ] ２[ニ] 個[コ] 買っ[カッ] た[タ] 。[。] ").unwrap();

        assert_eq!(tokens.len(), 9);
        assert_eq!(tokens[0], Token::new("昨日", "キノウ"));
        assert_eq!(tokens[4], Token::new("２", "ニ"));
    }

    #[test]
    fn unknown_and_bracket_surfaces() {
        let tokens = parse_nodes("Anki[] [[] ][] 猫[*] ").unwrap();

        assert_eq!(
            tokens,
            vec![
                Token::new("Anki", ""),
                Token::new("[", ""),
                Token::new("]", ""),
                Token::new("猫", ""),
            ]
        );
    }

    #[test]
    fn stops_at_first_empty_node() {
        let tokens = parse_nodes("猫[ネコ]  犬[イヌ] ").unwrap();

        assert_eq!(tokens, vec![Token::new("猫", "ネコ")]);
    }

    #[test]
    fn rejects_nodes_without_reading_brackets() {
        assert!(parse_nodes("猫 ").is_err());
    }

    #[test]
    fn missing_binary_is_reported() {
        let config = MecabConfig::default().with_program("/nonexistent/furiganify-mecab");
        let mut analyzer = MecabAnalyzer::new(config);

        let err = analyzer.analyze("猫").unwrap_err();
        assert!(err.to_string().contains("Failed to start mecab"));
    }
}
