use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable naming the mecab executable.
pub const MECAB_PATH_ENV: &str = "FURIGANIFY_MECAB";
/// Environment variable naming the mecab dictionary directory.
pub const MECAB_DICDIR_ENV: &str = "FURIGANIFY_MECAB_DICDIR";
/// Environment variable naming the mecab resource file.
pub const MECAB_RC_ENV: &str = "FURIGANIFY_MECAB_RC";

const DEFAULT_MECAB_PROGRAM: &str = "mecab";

/// Output format that prints every node as `surface[reading] `, one sentence per line.
const NODE_FORMAT_ARGS: [&str; 3] = [
    "--node-format=%m[%f[7]] ",
    "--eos-format=\n",
    "--unk-format=%m[] ",
];

/// How to launch the mecab process behind [`MecabAnalyzer`](crate::MecabAnalyzer).
///
/// The dictionary must be UTF-8 encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MecabConfig {
    pub program: PathBuf,
    pub dictionary_dir: Option<PathBuf>,
    pub rc_file: Option<PathBuf>,
}

impl Default for MecabConfig {
    fn default() -> Self {
        Self {
            program: env::var_os(MECAB_PATH_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MECAB_PROGRAM)),
            dictionary_dir: env::var_os(MECAB_DICDIR_ENV).map(PathBuf::from),
            rc_file: env::var_os(MECAB_RC_ENV).map(PathBuf::from),
        }
    }
}

impl MecabConfig {
    pub fn with_program(mut self, program: impl AsRef<Path>) -> Self {
        self.program = program.as_ref().to_path_buf();
        self
    }

    pub fn with_dictionary_dir(mut self, dictionary_dir: impl AsRef<Path>) -> Self {
        self.dictionary_dir = Some(dictionary_dir.as_ref().to_path_buf());
        self
    }

    pub fn with_rc_file(mut self, rc_file: impl AsRef<Path>) -> Self {
        self.rc_file = Some(rc_file.as_ref().to_path_buf());
        self
    }

    pub(crate) fn args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = NODE_FORMAT_ARGS.iter().map(OsString::from).collect();

        if let Some(dictionary_dir) = &self.dictionary_dir {
            args.push("-d".into());
            args.push(dictionary_dir.into());
        }
        if let Some(rc_file) = &self.rc_file {
            args.push("-r".into());
            args.push(rc_file.into());
        }

        args
    }
}
