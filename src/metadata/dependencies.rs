//! Third-party dependency detection from import statements.

use super::scanner::SourceScan;
use crate::config::DependencyConfig;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^import\s+(.+)$").expect("static regex"));

static FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^from\s+(\S+)\s+import\b").expect("static regex"));

/// Import names whose index name differs.
const CONVERSIONS: &[(&str, &str)] = &[
    ("yaml", "pyyaml"),
    ("PIL", "pillow"),
    ("bs4", "beautifulsoup4"),
    ("sklearn", "scikit-learn"),
    ("cv2", "opencv-python"),
    ("dateutil", "python-dateutil"),
];

/// Top-level modules shipped with CPython 3.
const STDLIB: &[&str] = &[
    "__future__", "_thread", "abc", "aifc", "argparse", "array", "ast", "asynchat",
    "asyncio", "asyncore", "atexit", "audioop", "base64", "bdb", "binascii", "bisect",
    "builtins", "bz2", "calendar", "cgi", "cgitb", "chunk", "cmath", "cmd", "code",
    "codecs", "codeop", "collections", "colorsys", "compileall", "concurrent",
    "configparser", "contextlib", "contextvars", "copy", "copyreg", "cProfile", "crypt",
    "csv", "ctypes", "curses", "dataclasses", "datetime", "dbm", "decimal", "difflib",
    "dis", "distutils", "doctest", "email", "encodings", "ensurepip", "enum", "errno",
    "faulthandler", "fcntl", "filecmp", "fileinput", "fnmatch", "fractions", "ftplib",
    "functools", "gc", "getopt", "getpass", "gettext", "glob", "graphlib", "grp", "gzip",
    "hashlib", "heapq", "hmac", "html", "http", "imaplib", "imghdr", "imp", "importlib",
    "inspect", "io", "ipaddress", "itertools", "json", "keyword", "lib2to3", "linecache",
    "locale", "logging", "lzma", "mailbox", "mailcap", "marshal", "math", "mimetypes",
    "mmap", "modulefinder", "msilib", "msvcrt", "multiprocessing", "netrc", "nis",
    "nntplib", "numbers", "operator", "optparse", "os", "ossaudiodev", "pathlib", "pdb",
    "pickle", "pickletools", "pipes", "pkgutil", "platform", "plistlib", "poplib",
    "posix", "posixpath", "pprint", "profile", "pstats", "pty", "pwd", "py_compile",
    "pyclbr", "pydoc", "queue", "quopri", "random", "re", "readline", "reprlib",
    "resource", "rlcompleter", "runpy", "sched", "secrets", "select", "selectors",
    "shelve", "shlex", "shutil", "signal", "site", "smtpd", "smtplib", "sndhdr",
    "socket", "socketserver", "spwd", "sqlite3", "ssl", "stat", "statistics", "string",
    "stringprep", "struct", "subprocess", "sunau", "symtable", "sys", "sysconfig",
    "syslog", "tabnanny", "tarfile", "telnetlib", "tempfile", "termios", "textwrap",
    "threading", "time", "timeit", "tkinter", "token", "tokenize", "tomllib", "trace",
    "traceback", "tracemalloc", "tty", "turtle", "types", "typing", "unicodedata",
    "unittest", "urllib", "uu", "uuid", "venv", "warnings", "wave", "weakref",
    "webbrowser", "winreg", "winsound", "wsgiref", "xdrlib", "xml", "xmlrpc", "zipapp",
    "zipfile", "zipimport", "zlib", "zoneinfo",
];

/// Whether an import name belongs to the standard library.
pub fn is_stdlib(module: &str) -> bool {
    STDLIB.contains(&module)
}

/// Index name for an import name, honoring configured conversions first.
pub fn index_name(module: &str, config: &DependencyConfig) -> String {
    if let Some(name) = config.conversions.get(module) {
        return name.clone();
    }
    CONVERSIONS
        .iter()
        .find(|(import, _)| *import == module)
        .map(|(_, index)| index.to_string())
        .unwrap_or_else(|| module.to_string())
}

/// Root import names of every top-level import statement, in source order.
pub fn imported_roots(scan: &SourceScan<'_>) -> Vec<String> {
    let mut roots = Vec::new();

    for line in scan.statements() {
        let line = line.split('#').next().unwrap_or_default().trim_end();

        if let Some(caps) = FROM_RE.captures(line) {
            let module = &caps[1];
            if module.starts_with('.') {
                log::debug!("Skipping relative import: {}", line);
                continue;
            }
            roots.push(root_of(module).to_string());
        } else if let Some(caps) = IMPORT_RE.captures(line) {
            for part in caps[1].split(',') {
                if let Some(module) = part.split_whitespace().next() {
                    roots.push(root_of(module).to_string());
                }
            }
        }
    }

    roots
}

/// Third-party requirements of a module.
///
/// Standard library, `__future__`, local siblings in `package_dir`, the module
/// itself and ignored names are dropped; the rest is converted to index names
/// and deduplicated in first-seen order.
pub fn find_requirements(
    scan: &SourceScan<'_>,
    module_name: &str,
    package_dir: &Path,
    config: &DependencyConfig,
) -> Vec<String> {
    let mut requirements: Vec<String> = Vec::new();

    for root in imported_roots(scan) {
        if root == module_name || is_stdlib(&root) {
            continue;
        }
        if config.ignore.iter().any(|i| *i == root) {
            log::debug!("Ignoring configured import: {}", root);
            continue;
        }
        if is_local_module(&root, package_dir) {
            log::debug!("Skipping local module: {}", root);
            continue;
        }

        let name = index_name(&root, config);
        if !requirements.contains(&name) {
            log::info!("Found dependency: {}", name);
            requirements.push(name);
        }
    }

    if !requirements.is_empty() {
        log::info!("Parsed dependencies. ({})", requirements.join(", "));
    }
    requirements
}

fn root_of(module: &str) -> &str {
    module.split('.').next().unwrap_or(module)
}

fn is_local_module(root: &str, package_dir: &Path) -> bool {
    package_dir.join(format!("{root}.py")).is_file() || package_dir.join(root).is_dir()
}
