//! Runtime context assembly

use super::stage::Stage;
use crate::APP_NAME;
use crate::config::{AppConfig, ConfigInit, LoadedConfig};
use crate::error::Result;
use crate::flags::CommonFlags;
use crate::logging::{LogSettings, Logger, resolve_log_settings};
use crate::paths::ResolvedPaths;
use tracing::debug;

/// Everything a command handler needs for one invocation.
///
/// Owns the log file handle. Closed explicitly with [`close`](Self::close)
/// or implicitly on drop.
#[derive(Debug)]
pub struct RuntimeContext {
    app: String,
    flags: CommonFlags,
    paths: ResolvedPaths,
    config: AppConfig,
    config_init: ConfigInit,
    log_settings: LogSettings,
    logger: Logger,
    stage: Stage,
}

struct Assembled {
    paths: ResolvedPaths,
    config: AppConfig,
    init: ConfigInit,
    log_settings: LogSettings,
    logger: Logger,
}

impl RuntimeContext {
    /// Bootstrap for the built-in application name.
    pub fn bootstrap(flags: CommonFlags) -> Result<Self> {
        Self::bootstrap_for(APP_NAME, flags)
    }

    /// Bootstrap for `app`.
    ///
    /// Flag validation happens before any filesystem access. The first
    /// failing stage aborts the sequence; no partially built context is
    /// returned.
    ///
    /// # Errors
    ///
    /// Any [`BootstrapError`](crate::BootstrapError) raised by a stage.
    pub fn bootstrap_for(app: &str, flags: CommonFlags) -> Result<Self> {
        flags.validate()?;

        let mut stage = Stage::Uninitialized;
        let assembled = match assemble(app, &flags, &mut stage) {
            Ok(assembled) => assembled,
            Err(e) => {
                debug!(app, stage = %stage, error = %e, "bootstrap aborted");
                return Err(e);
            }
        };

        let ctx = Self {
            app: app.to_string(),
            flags,
            paths: assembled.paths,
            config: assembled.config,
            config_init: assembled.init,
            log_settings: assembled.log_settings,
            logger: assembled.logger,
            stage: Stage::Ready,
        };
        ctx.report_startup();
        Ok(ctx)
    }

    fn report_startup(&self) {
        let config_file = self.paths.config_file.display();
        match self.config_init {
            ConfigInit::Existing => {}
            ConfigInit::Created => self
                .logger
                .info(format_args!("created default config at {config_file}")),
            ConfigInit::DryRunSkipped => self.logger.info(format_args!(
                "dry-run: would create default config at {config_file}"
            )),
        }
        if self.flags.dry_run {
            self.logger.info(format_args!(
                "dry-run: would ensure data dir {} and state dir {}",
                self.paths.data_dir.display(),
                self.paths.state_dir.display()
            ));
        }
        self.logger.debug(format_args!(
            "resolved paths: config={} data={} state={}",
            config_file,
            self.paths.data_dir.display(),
            self.paths.state_dir.display()
        ));
    }

    pub fn app(&self) -> &str {
        &self.app
    }

    pub fn flags(&self) -> &CommonFlags {
        &self.flags
    }

    pub fn paths(&self) -> &ResolvedPaths {
        &self.paths
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Whether this bootstrap found, created, or (dry-run) skipped the
    /// config file.
    pub fn config_init(&self) -> ConfigInit {
        self.config_init
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn log_settings(&self) -> &LogSettings {
        &self.log_settings
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn is_closed(&self) -> bool {
        self.stage == Stage::Closed
    }

    /// Release the log file handle. Closing again is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the error from flushing the log targets, if any.
    pub fn close(&mut self) -> std::io::Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.stage = Stage::Closed;
        self.logger.close()
    }
}

impl Drop for RuntimeContext {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            debug!(error = %e, "failed to close runtime context");
        }
    }
}

fn assemble(app: &str, flags: &CommonFlags, stage: &mut Stage) -> Result<Assembled> {
    let paths = ResolvedPaths::discover(app, flags.config_path.as_deref())?;
    *stage = Stage::PathsResolved;

    let LoadedConfig { config, init } =
        AppConfig::load_or_init(app, &paths.config_file, flags.dry_run)?;
    *stage = Stage::ConfigLoaded;

    let paths = paths.apply_overrides(&config.paths)?;
    *stage = Stage::PathsOverridden;

    paths.ensure_directories(flags.dry_run)?;
    *stage = Stage::DirectoriesEnsured;

    let log_settings = resolve_log_settings(flags, &config.logging);
    let logger = Logger::open(&log_settings)?;
    *stage = Stage::LoggingConfigured;

    debug!(app, %paths, "bootstrap complete");
    Ok(Assembled {
        paths,
        config,
        init,
        log_settings,
        logger,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BootstrapError;
    use crate::logging::{LogLevel, LogTarget};
    use crate::test_support::EnvGuard;
    use serial_test::serial;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// Point XDG data/state into `root` so nothing escapes the temp dir.
    fn isolate(root: &Path) -> EnvGuard {
        EnvGuard::set(&[
            ("XDG_DATA_HOME", Some(root.join("data").to_str().unwrap())),
            ("XDG_STATE_HOME", Some(root.join("state").to_str().unwrap())),
            ("BOOTKIT_CTX_TEST__PROFILE", None),
        ])
    }

    fn flags_for(config: PathBuf) -> CommonFlags {
        CommonFlags {
            config_path: Some(config),
            quiet: true,
            ..Default::default()
        }
    }

    const APP: &str = "bootkit-ctx-test";

    #[test]
    #[serial]
    fn test_bootstrap_reaches_ready() {
        let temp = TempDir::new().unwrap();
        let _env = isolate(temp.path());
        let config_file = temp.path().join("config.toml");

        let mut ctx = RuntimeContext::bootstrap_for(APP, flags_for(config_file.clone())).unwrap();

        assert_eq!(ctx.stage(), Stage::Ready);
        assert_eq!(ctx.app(), APP);
        assert_eq!(ctx.paths().config_file, config_file);
        assert!(config_file.is_file());
        assert!(ctx.paths().data_dir.is_dir());
        assert!(ctx.paths().state_dir.is_dir());
        assert_eq!(ctx.config().runtime.timeout_seconds, Some(60));
        assert_eq!(ctx.config_init(), ConfigInit::Created);
        assert_eq!(ctx.log_settings().level, LogLevel::Error);
        assert_eq!(ctx.log_settings().targets, vec![LogTarget::Discard]);

        ctx.close().unwrap();
        assert!(ctx.is_closed());
        ctx.close().unwrap();
    }

    #[test]
    #[serial]
    fn test_second_bootstrap_is_identical_and_keeps_file() {
        let temp = TempDir::new().unwrap();
        let _env = isolate(temp.path());
        let config_file = temp.path().join("config.toml");

        let first = RuntimeContext::bootstrap_for(APP, flags_for(config_file.clone())).unwrap();
        fs::write(&config_file, "profile = \"edited\"\n").unwrap();
        let second = RuntimeContext::bootstrap_for(APP, flags_for(config_file.clone())).unwrap();
        let third = RuntimeContext::bootstrap_for(APP, flags_for(config_file.clone())).unwrap();

        assert_eq!(first.paths(), second.paths());
        assert_eq!(second.config_init(), ConfigInit::Existing);
        assert_eq!(fs::read_to_string(&config_file).unwrap(), "profile = \"edited\"\n");
        assert_eq!(second.config(), third.config());
        assert_eq!(second.config().profile, "edited");
    }

    #[test]
    #[serial]
    fn test_dry_run_matches_real_run_without_writing() {
        let temp = TempDir::new().unwrap();
        let _env = isolate(temp.path());
        let config_file = temp.path().join("config.toml");
        fs::write(&config_file, "[runtime]\nparallelism = 3\n").unwrap();

        let mut dry_flags = flags_for(config_file.clone());
        dry_flags.dry_run = true;
        let dry = RuntimeContext::bootstrap_for(APP, dry_flags).unwrap();
        assert!(!dry.paths().data_dir.exists());
        assert!(!dry.paths().state_dir.exists());

        let real = RuntimeContext::bootstrap_for(APP, flags_for(config_file)).unwrap();
        assert_eq!(dry.paths(), real.paths());
        assert_eq!(dry.config(), real.config());
        assert_eq!(real.config().runtime.parallelism, Some(3));
    }

    #[test]
    #[serial]
    fn test_dry_run_with_missing_config_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let _env = isolate(temp.path());
        let config_file = temp.path().join("absent/config.toml");

        let mut flags = flags_for(config_file.clone());
        flags.dry_run = true;
        let ctx = RuntimeContext::bootstrap_for(APP, flags).unwrap();

        assert!(!config_file.exists());
        assert!(!temp.path().join("absent").exists());
        assert_eq!(ctx.config_init(), ConfigInit::DryRunSkipped);
        assert_eq!(ctx.config().profile, "default");
    }

    #[test]
    #[serial]
    fn test_conflicting_output_fails_before_io() {
        let temp = TempDir::new().unwrap();
        let _env = isolate(temp.path());
        let config_file = temp.path().join("config.toml");

        let mut flags = flags_for(config_file.clone());
        flags.json = true;
        flags.yaml = true;

        let err = RuntimeContext::bootstrap_for(APP, flags).unwrap_err();
        assert!(matches!(err, BootstrapError::ConflictingOutputFormat));
        assert!(!config_file.exists());
        assert!(!temp.path().join("data").exists());
    }

    #[test]
    #[serial]
    fn test_path_overrides_from_config_are_created() {
        let temp = TempDir::new().unwrap();
        let _env = isolate(temp.path());
        let config_file = temp.path().join("config.toml");
        let custom = temp.path().join("custom-data");
        fs::write(
            &config_file,
            format!("[paths]\ndata_dir = {:?}\n", custom.to_str().unwrap()),
        )
        .unwrap();

        let ctx = RuntimeContext::bootstrap_for(APP, flags_for(config_file)).unwrap();
        assert_eq!(ctx.paths().data_dir, custom);
        assert!(custom.is_dir());
    }

    #[test]
    #[serial]
    fn test_log_file_released_on_drop() {
        let temp = TempDir::new().unwrap();
        let _env = isolate(temp.path());
        let config_file = temp.path().join("config.toml");
        let log_file = temp.path().join("app.log");
        fs::write(
            &config_file,
            format!("[logging]\nlevel = \"info\"\nfile = {:?}\n", log_file.to_str().unwrap()),
        )
        .unwrap();

        {
            let ctx = RuntimeContext::bootstrap_for(APP, flags_for(config_file)).unwrap();
            assert_eq!(ctx.log_settings().targets, vec![LogTarget::File(log_file.clone())]);
            ctx.logger().error("handler failed");
        }

        let contents = fs::read_to_string(&log_file).unwrap();
        assert_eq!(contents, "ERROR handler failed\n");
    }

    #[test]
    #[serial]
    fn test_unopenable_log_file_aborts() {
        let temp = TempDir::new().unwrap();
        let _env = isolate(temp.path());
        let config_file = temp.path().join("config.toml");
        let log_file = temp.path().join("no-such-dir/app.log");
        fs::write(
            &config_file,
            format!("[logging]\nfile = {:?}\n", log_file.to_str().unwrap()),
        )
        .unwrap();

        let err = RuntimeContext::bootstrap_for(APP, flags_for(config_file)).unwrap_err();
        assert!(matches!(err, BootstrapError::LogFileOpenFailed { path, .. } if path == log_file));
    }
}
