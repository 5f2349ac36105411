//! Configuration.
//!
//! This module primarily contains the type [`Config`] that holds all the
//! configuration used by lintd. It can be loaded both from a TOML
//! formatted config file and command line options.

use std::{env, fmt, fs};
use std::io::Read;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use clap::{Command, Args, ArgAction, ArgMatches, FromArgMatches, Parser};
use dirs::home_dir;
use log::{LevelFilter, error, warn};
#[cfg(unix)] use syslog::Facility;
use crate::error::Failed;
use crate::lint::AnalysisOptions;


//------------ Defaults for Some Values --------------------------------------

/// The default address to listen on.
const DEFAULT_LISTEN_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);

/// The default port to listen on.
const DEFAULT_PORT: u16 = 8000;

/// The default maximum size of a part’s header section.
const DEFAULT_MAX_HEADER_SIZE: usize = 16 * 1024;

/// The default maximum size of the source part.
const DEFAULT_MAX_SOURCE_SIZE: usize = 4 * 1024 * 1024;

/// The default syslog facility.
#[cfg(unix)]
const DEFAULT_SYSLOG_FACILITY: Facility = Facility::LOG_DAEMON;

/// The name of the config file in the home directory.
const DEFAULT_CONFIG_FILE: &str = ".lintd.conf";


//------------ Config --------------------------------------------------------

/// The complete configuration of lintd.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Config {
    /// The address to listen on.
    pub listen_addr: IpAddr,

    /// The port to listen on.
    pub port: u16,

    /// The maximum size of the header section of a part in bytes.
    pub max_header_size: usize,

    /// The maximum size of the source part in bytes.
    pub max_source_size: usize,

    /// The number of threads available for running the analysis engine.
    pub analysis_threads: usize,

    /// The log levels to be logged.
    pub log_level: LevelFilter,

    /// The target to log to.
    pub log_target: LogTarget,

    /// The options passed to the analysis engine.
    pub lint: AnalysisOptions,
}


impl Config {
    /// Adds the command line arguments to a clap command.
    ///
    /// The function follows clap’s builder pattern: it takes a command,
    /// adds a bunch of arguments to it and returns it at the end.
    pub fn config_args(app: Command) -> Command {
        GlobalArgs::augment_args(app)
    }

    /// Creates a configuration from command line matches.
    ///
    /// The function attempts to create configuration from the command line
    /// arguments provided via `matches`. It will try to read a config file
    /// if provided via the config file option (`-c` or `--config`) or a
    /// file in `$HOME/.lintd.conf` otherwise. If the latter doesn’t
    /// exist either, starts with a default configuration.
    ///
    /// All relative paths given in command line arguments will be interpreted
    /// relative to `cur_dir`. Conversely, paths in the config file are
    /// treated as relative to the config file’s directory.
    pub fn from_arg_matches(
        matches: &ArgMatches,
        cur_dir: &Path,
    ) -> Result<Self, Failed> {
        let mut res = Self::create_base_config(
            matches.get_one::<PathBuf>("config")
                .map(|path| cur_dir.join(path))
                .as_deref()
        )?;
        res.apply_arg_matches(matches, cur_dir)?;
        Ok(res)
    }

    /// Applies the command line arguments to a configuration.
    ///
    /// The path arguments in `matches` will be interpreted relative to
    /// `cur_dir`.
    fn apply_arg_matches(
        &mut self,
        matches: &ArgMatches,
        cur_dir: &Path,
    ) -> Result<(), Failed> {
        let args = GlobalArgs::from_arg_matches(
            matches
        ).expect("bug in command line arguments parser");

        self.apply_log_matches(&args, cur_dir)?;

        // listen_addr
        if let Some(addr) = args.listen {
            self.listen_addr = addr
        }

        // port
        if let Some(port) = args.port.as_ref() {
            match u16::from_str(port) {
                Ok(port) => self.port = port,
                Err(_) => {
                    warn!(
                        "Ignoring invalid port '{}', using port {}.",
                        port, self.port
                    );
                }
            }
        }

        // max_header_size
        if let Some(size) = args.max_header_size {
            self.max_header_size = size
        }

        // max_source_size
        if let Some(size) = args.max_source_size {
            self.max_source_size = size
        }

        // analysis_threads
        if let Some(threads) = args.analysis_threads {
            if threads == 0 {
                error!("Invalid value for analysis-threads: must not be 0.");
                return Err(Failed)
            }
            self.analysis_threads = threads
        }

        // log_level
        match (args.verbose, args.quiet) {
            (0, 0) => { }
            (1, 0) => self.log_level = LevelFilter::Info,
            (_, 0) => self.log_level = LevelFilter::Debug,
            (0, 1) => self.log_level = LevelFilter::Error,
            (0, _) => self.log_level = LevelFilter::Off,
            _ => {
                error!("Conflicting options -v and -q.");
                return Err(Failed)
            }
        }

        Ok(())
    }

    /// Applies the logging-specific command line arguments to the config.
    ///
    /// This is the Unix version that also considers syslog as a valid
    /// target.
    #[cfg(unix)]
    fn apply_log_matches(
        &mut self,
        args: &GlobalArgs,
        cur_dir: &Path,
    ) -> Result<(), Failed> {
        if args.syslog {
            if let Some(facility) = args.syslog_facility.as_ref() {
                self.log_target = LogTarget::Syslog(
                    match Facility::from_str(facility) {
                        Ok(value) => value,
                        Err(_) => {
                            error!("Invalid value for syslog-facility.");
                            return Err(Failed);
                        }
                    }
                )
            }
            else if !matches!(self.log_target, LogTarget::Syslog(_)) {
                // If we don’t have a syslog facility already from the config
                // file, we use the default.
                self.log_target = LogTarget::Syslog(DEFAULT_SYSLOG_FACILITY)
            }
        }
        else if let Some(file) = args.logfile.as_ref() {
            self.log_target = Self::log_file_target(file, cur_dir)
        }
        Ok(())
    }

    /// Applies the logging-specific command line arguments to the config.
    ///
    /// This is the non-Unix version that does not use syslog.
    #[cfg(not(unix))]
    fn apply_log_matches(
        &mut self,
        args: &GlobalArgs,
        cur_dir: &Path,
    ) -> Result<(), Failed> {
        if let Some(file) = args.logfile.as_ref() {
            self.log_target = Self::log_file_target(file, cur_dir)
        }
        Ok(())
    }

    /// Returns the log target for the `--logfile` option.
    fn log_file_target(file: &str, cur_dir: &Path) -> LogTarget {
        if file == "-" {
            LogTarget::Stderr
        }
        else {
            LogTarget::File(cur_dir.join(file))
        }
    }

    /// Creates the correct base configuration for the given config file path.
    ///
    /// If no config path is given, tries to read the default config in
    /// `$HOME/.lintd.conf`. If that doesn’t exist, creates a default
    /// config.
    fn create_base_config(path: Option<&Path>) -> Result<Self, Failed> {
        let file = match path {
            Some(path) => {
                match ConfigFile::read(path)? {
                    Some(file) => file,
                    None => {
                        error!("Cannot read config file {}", path.display());
                        return Err(Failed);
                    }
                }
            }
            None => {
                match home_dir() {
                    Some(dir) => match ConfigFile::read(
                        &dir.join(DEFAULT_CONFIG_FILE)
                    )? {
                        Some(file) => file,
                        None => return Ok(Self::default()),
                    }
                    None => return Ok(Self::default())
                }
            }
        };
        Self::from_config_file(file)
    }

    /// Creates a base config from a config file.
    fn from_config_file(mut file: ConfigFile) -> Result<Self, Failed> {
        let log_target = Self::log_target_from_config_file(&mut file)?;
        let res = Config {
            listen_addr: {
                file.take_from_str("listen-addr")?
                    .unwrap_or(DEFAULT_LISTEN_ADDR)
            },
            port: file.take_port("port")?.unwrap_or(DEFAULT_PORT),
            max_header_size: {
                file.take_usize("max-header-size")?
                    .unwrap_or(DEFAULT_MAX_HEADER_SIZE)
            },
            max_source_size: {
                file.take_usize("max-source-size")?
                    .unwrap_or(DEFAULT_MAX_SOURCE_SIZE)
            },
            analysis_threads: {
                match file.take_usize("analysis-threads")? {
                    Some(0) => {
                        error!(
                            "Failed in config file {}: \
                             'analysis-threads' must not be 0.",
                            file.path.display()
                        );
                        return Err(Failed)
                    }
                    Some(threads) => threads,
                    None => num_cpus::get(),
                }
            },
            log_level: {
                file.take_from_str("log-level")?.unwrap_or(LevelFilter::Warn)
            },
            log_target,
            lint: file.take_lint("lint")?.unwrap_or_default(),
        };
        file.check_exhausted()?;
        Ok(res)
    }

    /// Determines the logging target from the config file.
    ///
    /// This is the Unix version that also deals with syslog.
    #[cfg(unix)]
    fn log_target_from_config_file(
        file: &mut ConfigFile
    ) -> Result<LogTarget, Failed> {
        let facility = file.take_string("syslog-facility")?;
        let facility = facility.as_deref().unwrap_or("daemon");
        let facility = match Facility::from_str(facility) {
            Ok(value) => value,
            Err(_) => {
                error!(
                    "Failed in config file {}: invalid syslog-facility.",
                    file.path.display()
                );
                return Err(Failed);
            }
        };
        let log_target = file.take_string("log")?;
        let log_file = file.take_path("log-file")?;
        match log_target.as_deref() {
            Some("stderr") | None => Ok(LogTarget::Stderr),
            Some("syslog") => Ok(LogTarget::Syslog(facility)),
            Some("file") => Self::log_file_from_config_file(file, log_file),
            Some(value) => {
                error!(
                    "Failed in config file {}: \
                     invalid log target '{}'",
                     file.path.display(),
                     value
                );
                Err(Failed)
            }
        }
    }

    /// Determines the logging target from the config file.
    ///
    /// This is the non-Unix version that only logs to stderr or a file.
    #[cfg(not(unix))]
    fn log_target_from_config_file(
        file: &mut ConfigFile
    ) -> Result<LogTarget, Failed> {
        let log_target = file.take_string("log")?;
        let log_file = file.take_path("log-file")?;
        match log_target.as_deref() {
            Some("stderr") | None => Ok(LogTarget::Stderr),
            Some("file") => Self::log_file_from_config_file(file, log_file),
            Some(value) => {
                error!(
                    "Failed in config file {}: \
                     invalid log target '{}'",
                    file.path.display(), value
                );
                Err(Failed)
            }
        }
    }

    /// Returns the file log target if a log file was given.
    fn log_file_from_config_file(
        file: &ConfigFile, log_file: Option<PathBuf>
    ) -> Result<LogTarget, Failed> {
        match log_file {
            Some(path) => Ok(LogTarget::File(path)),
            None => {
                error!(
                    "Failed in config file {}: \
                     log target \"file\" requires 'log-file' value.",
                    file.path.display()
                );
                Err(Failed)
            }
        }
    }

    /// Returns the socket address to listen on.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.listen_addr, self.port)
    }

    /// Returns a TOML representation of the config.
    pub fn to_toml(&self) -> toml::Value {
        let mut res = toml::value::Table::new();
        res.insert("listen-addr".into(), self.listen_addr.to_string().into());
        res.insert("port".into(), i64::from(self.port).into());
        res.insert(
            "max-header-size".into(),
            (self.max_header_size as i64).into()
        );
        res.insert(
            "max-source-size".into(),
            (self.max_source_size as i64).into()
        );
        res.insert(
            "analysis-threads".into(),
            (self.analysis_threads as i64).into()
        );
        res.insert("log-level".into(), self.log_level.to_string().into());
        match self.log_target {
            #[cfg(unix)]
            LogTarget::Syslog(facility) => {
                res.insert("log".into(), "syslog".into());
                res.insert(
                    "syslog-facility".into(),
                    facility_to_string(facility).into()
                );
            }
            LogTarget::Stderr => {
                res.insert("log".into(), "stderr".into());
            }
            LogTarget::File(ref file) => {
                res.insert("log".into(), "file".into());
                res.insert(
                    "log-file".into(),
                    file.display().to_string().into()
                );
            }
        }
        res.insert("lint".into(), self.lint.to_toml());
        res.into()
    }
}


//--- Default

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: DEFAULT_LISTEN_ADDR,
            port: DEFAULT_PORT,
            max_header_size: DEFAULT_MAX_HEADER_SIZE,
            max_source_size: DEFAULT_MAX_SOURCE_SIZE,
            analysis_threads: num_cpus::get(),
            log_level: LevelFilter::Warn,
            log_target: LogTarget::default(),
            lint: AnalysisOptions::default(),
        }
    }
}


//--- Display

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_toml())
    }
}


//------------ LogTarget -----------------------------------------------------

/// The target to log to.
#[derive(Clone, Debug, Default)]
pub enum LogTarget {
    /// Syslog.
    ///
    /// The argument is the syslog facility to use.
    #[cfg(unix)]
    Syslog(Facility),

    /// Stderr.
    #[default]
    Stderr,

    /// A file.
    ///
    /// The argument is the file name.
    File(PathBuf)
}


//--- PartialEq and Eq

impl PartialEq for LogTarget {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            #[cfg(unix)]
            (&LogTarget::Syslog(s), &LogTarget::Syslog(o)) => {
                (s as usize) == (o as usize)
            }
            (&LogTarget::Stderr, &LogTarget::Stderr) => true,
            (LogTarget::File(s), LogTarget::File(o)) => s == o,
            _ => false
        }
    }
}

impl Eq for LogTarget { }


//------------ GlobalArgs ----------------------------------------------------

/// The command line arguments.
#[derive(Clone, Debug, Parser)]
struct GlobalArgs {
    /// Read base configuration from this file
    #[arg(short, long, value_name="PATH")]
    config: Option<PathBuf>,

    /// Address to listen on for HTTP connections
    #[arg(long, value_name = "ADDR")]
    listen: Option<IpAddr>,

    /// Port to listen on for HTTP connections
    #[arg(long, value_name = "PORT")]
    port: Option<String>,

    /// Maximum size of the header section of a part
    #[arg(long, value_name = "BYTES")]
    max_header_size: Option<usize>,

    /// Maximum size of the source code
    #[arg(long, value_name = "BYTES")]
    max_source_size: Option<usize>,

    /// Number of threads for running the analysis
    #[arg(long, value_name = "COUNT")]
    analysis_threads: Option<usize>,

    /// Log more information, twice for even more
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Log less information, twice for no information
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    quiet: u8,

    /// Log to syslog
    #[cfg(unix)]
    #[arg(long)]
    syslog: bool,

    /// Facility to use for syslog logging
    #[cfg(unix)]
    #[arg(long, value_name = "FACILITY")]
    syslog_facility: Option<String>,

    /// Log to this file
    #[arg(long, value_name = "PATH")]
    logfile: Option<String>,
}


//------------ ConfigFile ----------------------------------------------------

/// The content of a config file.
///
/// This is a thin wrapper around `toml::Table` to make dealing with it more
/// convenient.
#[derive(Clone, Debug)]
struct ConfigFile {
    /// The content of the file.
    content: toml::value::Table,

    /// The path to the config file.
    path: PathBuf,

    /// The directory we found the file in.
    ///
    /// This is used in relative paths.
    dir: PathBuf,
}

impl ConfigFile {
    /// Reads the config file at the given path.
    ///
    /// If there is no such file, returns `None`. If there is a file but it
    /// is broken, aborts.
    fn read(path: &Path) -> Result<Option<Self>, Failed> {
        let mut file = match fs::File::open(path) {
            Ok(file) => file,
            Err(_) => return Ok(None)
        };
        let mut config = String::new();
        if let Err(err) = file.read_to_string(&mut config) {
            error!(
                "Failed to read config file {}: {}",
                path.display(), err
            );
            return Err(Failed);
        }
        Self::parse(&config, path).map(Some)
    }

    /// Parses the content of the file from a string.
    fn parse(content: &str, path: &Path) -> Result<Self, Failed> {
        let content = match toml::from_str(content) {
            Ok(toml::Value::Table(content)) => content,
            Ok(_) => {
                error!(
                    "Failed to parse config file {}: Not a mapping.",
                    path.display()
                );
                return Err(Failed);
            }
            Err(err) => {
                error!(
                    "Failed to parse config file {}: {}",
                    path.display(), err
                );
                return Err(Failed);
            }
        };
        let path = if path.is_relative() {
            match env::current_dir() {
                Ok(dir) => dir.join(path),
                Err(err) => {
                    error!(
                        "Fatal: Can't determine current directory: {}.",
                        err
                    );
                    return Err(Failed);
                }
            }
        }
        else {
            path.into()
        };
        let dir = path.parent().map(Into::into).unwrap_or_default();
        Ok(ConfigFile { content, path, dir })
    }

    /// Takes an unsigned integer value from the config file.
    ///
    /// The value is taken from the given `key`. Returns `Ok(None)` if there
    /// is no such key. Returns an error if the key exists but the value
    /// isn’t an integer or if it is negative.
    fn take_u64(&mut self, key: &str) -> Result<Option<u64>, Failed> {
        match self.content.remove(key) {
            Some(value) => {
                if let toml::Value::Integer(res) = value {
                    match u64::try_from(res) {
                        Ok(res) => Ok(Some(res)),
                        Err(_) => {
                            error!(
                                "Failed in config file {}: \
                                '{}' expected to be a positive integer.",
                                self.path.display(), key
                            );
                            Err(Failed)
                        }
                    }
                }
                else {
                    error!(
                        "Failed in config file {}: \
                         '{}' expected to be an integer.",
                        self.path.display(), key
                    );
                    Err(Failed)
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a `usize` value from the config file.
    ///
    /// The value is taken from the given `key`. Returns `Ok(None)` if there
    /// is no such key. Returns an error if the key exists but the value
    /// isn’t an integer or if it is out of bounds.
    fn take_usize(&mut self, key: &str) -> Result<Option<usize>, Failed> {
        match self.take_u64(key)? {
            Some(value) => match usize::try_from(value) {
                Ok(value) => Ok(Some(value)),
                Err(_) => {
                    error!(
                        "Failed in config file {}: \
                        '{}' value is too large.",
                        self.path.display(), key
                    );
                    Err(Failed)
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a port number from the config file.
    fn take_port(&mut self, key: &str) -> Result<Option<u16>, Failed> {
        match self.take_u64(key)? {
            Some(value) => match u16::try_from(value) {
                Ok(value) => Ok(Some(value)),
                Err(_) => {
                    error!(
                        "Failed in config file {}: \
                        '{}' is not a valid port number.",
                        self.path.display(), key
                    );
                    Err(Failed)
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a string value from the config file.
    ///
    /// The value is taken from the given `key`. Returns `Ok(None)` if there
    /// is no such key. Returns an error if the key exists but the value
    /// isn’t a string.
    fn take_string(&mut self, key: &str) -> Result<Option<String>, Failed> {
        match self.content.remove(key) {
            Some(value) => {
                if let toml::Value::String(res) = value {
                    Ok(Some(res))
                }
                else {
                    error!(
                        "Failed in config file {}: \
                         '{}' expected to be a string.",
                        self.path.display(), key
                    );
                    Err(Failed)
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a string encoded value from the config file.
    ///
    /// The value is taken from the given `key`. It is expected to be a
    /// string and will be converted to the final type via `FromStr::from_str`.
    ///
    /// Returns `Ok(None)` if the key doesn’t exist. Returns an error if the
    /// key exists but the value isn’t a string or conversion fails.
    fn take_from_str<T>(&mut self, key: &str) -> Result<Option<T>, Failed>
    where T: FromStr, T::Err: fmt::Display {
        match self.take_string(key)? {
            Some(value) => {
                match T::from_str(&value) {
                    Ok(some) => Ok(Some(some)),
                    Err(err) => {
                        error!(
                            "Failed in config file {}: \
                             illegal value in '{}': {}.",
                            self.path.display(), key, err
                        );
                        Err(Failed)
                    }
                }
            }
            None => Ok(None)
        }
    }

    /// Takes a path value from the config file.
    ///
    /// The path is taken from the given `key`. It must be a string value.
    /// It is treated as relative to the directory of the config file. If it
    /// is indeed a relative path, it is expanded accordingly and an absolute
    /// path is returned.
    ///
    /// Returns `Ok(None)` if the key does not exist. Returns an error if the
    /// key exists but the value isn’t a string.
    fn take_path(&mut self, key: &str) -> Result<Option<PathBuf>, Failed> {
        self.take_string(key).map(|opt| opt.map(|path| self.dir.join(path)))
    }

    /// Takes the analysis options from the config file.
    ///
    /// The options are in a table under the given `key`. Returns `Ok(None)`
    /// if there is no such key. Returns an error if the key exists but
    /// isn’t a table or contains invalid options.
    fn take_lint(
        &mut self, key: &str
    ) -> Result<Option<AnalysisOptions>, Failed> {
        match self.content.remove(key) {
            Some(value @ toml::Value::Table(_)) => {
                match AnalysisOptions::from_toml(value) {
                    Ok(options) => Ok(Some(options)),
                    Err(err) => {
                        error!(
                            "Failed in config file {}: \
                             illegal value in '{}': {}",
                            self.path.display(), key, err
                        );
                        Err(Failed)
                    }
                }
            }
            Some(_) => {
                error!(
                    "Failed in config file {}: \
                     '{}' expected to be a table.",
                    self.path.display(), key
                );
                Err(Failed)
            }
            None => Ok(None)
        }
    }

    /// Checks whether the config file is now empty.
    ///
    /// If it isn’t, logs a complaint and returns an error.
    fn check_exhausted(&self) -> Result<(), Failed> {
        if !self.content.is_empty() {
            let keys: Vec<_> = self.content.keys().map(String::as_str).collect();
            error!(
                "Failed in config file {}: Unknown settings {}.",
                self.path.display(), keys.join(",")
            );
            Err(Failed)
        }
        else {
            Ok(())
        }
    }
}


//------------ Helpers -------------------------------------------------------

/// Converts the syslog facility name to the facility type.
#[cfg(unix)]
fn facility_to_string(facility: Facility) -> String {
    use syslog::Facility::*;

    match facility {
        LOG_KERN => "kern",
        LOG_USER => "user",
        LOG_MAIL => "mail",
        LOG_DAEMON => "daemon",
        LOG_AUTH => "auth",
        LOG_SYSLOG => "syslog",
        LOG_LPR => "lpr",
        LOG_NEWS => "news",
        LOG_UUCP => "uucp",
        LOG_CRON => "cron",
        LOG_AUTHPRIV => "authpriv",
        LOG_FTP => "ftp",
        LOG_LOCAL0 => "local0",
        LOG_LOCAL1 => "local1",
        LOG_LOCAL2 => "local2",
        LOG_LOCAL3 => "local3",
        LOG_LOCAL4 => "local4",
        LOG_LOCAL5 => "local5",
        LOG_LOCAL6 => "local6",
        LOG_LOCAL7 => "local7",
    }.into()
}


//============ Tests =========================================================

#[cfg(test)]
mod test {
    use std::io::Write;
    use super::*;

    fn process_args(args: &[&str]) -> Config {
        let mut config = Config::default();
        config.apply_arg_matches(
            &Config::config_args(Command::new("lintd"))
                .get_matches_from(args),
            Path::new("/test")
        ).unwrap();
        config
    }

    fn parse_file(content: &str) -> Result<Config, Failed> {
        Config::from_config_file(
            ConfigFile::parse(content, Path::new("/test/lintd.conf")).unwrap()
        )
    }

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.listen_addr, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_header_size, 16384);
        assert_eq!(config.max_source_size, 4194304);
        assert_eq!(config.analysis_threads, num_cpus::get());
        assert_eq!(config.log_level, LevelFilter::Warn);
        assert_eq!(config.log_target, LogTarget::Stderr);
        assert_eq!(config.lint, AnalysisOptions::default());
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8000");
    }

    #[test]
    #[cfg(unix)] // ... because of drive letters in absolute paths on Windows.
    fn good_config_file() {
        let config = parse_file(
            "listen-addr = \"127.0.0.1\"\n\
             port = 8080\n\
             max-header-size = 1024\n\
             max-source-size = 65536\n\
             analysis-threads = 3\n\
             log-level = \"info\"\n\
             log = \"file\"\n\
             log-file = \"lintd.log\"\n\
             [lint]\n\
             white = false\n\
             maxlen = 100\n"
        ).unwrap();
        assert_eq!(config.listen_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_header_size, 1024);
        assert_eq!(config.max_source_size, 65536);
        assert_eq!(config.analysis_threads, 3);
        assert_eq!(config.log_level, LevelFilter::Info);
        assert_eq!(
            config.log_target,
            LogTarget::File(PathBuf::from("/test/lintd.log"))
        );
        assert!(!config.lint.white);
        assert!(config.lint.eqeqeq);
        assert_eq!(config.lint.maxlen, Some(100));
    }

    #[test]
    fn minimal_config_file() {
        let config = parse_file("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn bad_config_file() {
        assert!(parse_file("prot = 8000").is_err());
        assert!(parse_file("port = 80000").is_err());
        assert!(parse_file("port = -1").is_err());
        assert!(parse_file("port = \"8000\"").is_err());
        assert!(parse_file("analysis-threads = 0").is_err());
        assert!(parse_file("log = \"file\"").is_err());
        assert!(parse_file("log = \"nowhere\"").is_err());
        assert!(parse_file("lint = true").is_err());
        assert!(parse_file("[lint]\nwhitespace = true").is_err());
    }

    #[test]
    fn read_your_own_config() {
        let mut out_config = Config::default();
        out_config.port = 9000;
        out_config.lint.maxlen = Some(80);
        let out_file = format!("{}", out_config);
        let in_config = parse_file(&out_file).unwrap();
        assert_eq!(out_config, in_config);
    }

    #[test]
    fn config_file_on_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 8123").unwrap();
        let matches = Config::config_args(Command::new("lintd"))
            .get_matches_from([
                "lintd", "-c", file.path().to_str().unwrap(),
                "--max-source-size", "100"
            ]);
        let config = Config::from_arg_matches(
            &matches, Path::new("/test")
        ).unwrap();
        assert_eq!(config.port, 8123);
        assert_eq!(config.max_source_size, 100);
    }

    #[test]
    fn missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.conf");
        let matches = Config::config_args(Command::new("lintd"))
            .get_matches_from(["lintd", "-c", path.to_str().unwrap()]);
        assert!(Config::from_arg_matches(&matches, Path::new("/")).is_err());
    }

    #[test]
    #[cfg(unix)]
    fn basic_args() {
        let config = process_args(&[
            "lintd", "--listen", "127.0.0.1", "--port", "8001",
            "--max-header-size", "512", "--analysis-threads", "2",
            "--syslog", "--syslog-facility", "auth"
        ]);
        assert_eq!(config.listen_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 8001);
        assert_eq!(config.max_header_size, 512);
        assert_eq!(config.analysis_threads, 2);
        assert_eq!(config.log_target, LogTarget::Syslog(Facility::LOG_AUTH));

        let config = process_args(&["lintd", "--logfile", "lintd.log"]);
        assert_eq!(
            config.log_target,
            LogTarget::File(PathBuf::from("/test/lintd.log"))
        );
    }

    #[test]
    fn bad_port_is_ignored() {
        assert_eq!(process_args(&["lintd", "--port", "http"]).port, 8000);
        assert_eq!(process_args(&["lintd", "--port", "70000"]).port, 8000);
        assert_eq!(process_args(&["lintd", "--port", "8002"]).port, 8002);
    }

    #[test]
    fn verbosity() {
        let config = process_args(&["lintd"]);
        assert_eq!(config.log_level, LevelFilter::Warn);
        let config = process_args(&["lintd", "-v"]);
        assert_eq!(config.log_level, LevelFilter::Info);
        let config = process_args(&["lintd", "-vv"]);
        assert_eq!(config.log_level, LevelFilter::Debug);
        let config = process_args(&["lintd", "-q"]);
        assert_eq!(config.log_level, LevelFilter::Error);
        let config = process_args(&["lintd", "-qq"]);
        assert_eq!(config.log_level, LevelFilter::Off);
    }
}
