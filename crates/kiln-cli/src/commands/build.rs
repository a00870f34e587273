//! Build command implementation.
//!
//! One-shot mode runs a single pass and exits with its outcome. Watch mode
//! runs an initial pass, then keeps rebuilding on coalesced file changes; a
//! failed pass surfaces its error and leaves the previous output (and the
//! watcher) intact.

use crate::cli::BuildArgs;
use crate::config::KilnConfig;
use crate::error::Result;
use crate::ui;
use crate::watch;
use kiln_bundler::{resolve_target, Bundler};
use std::path::Path;
use std::time::{Duration, Instant};

/// Execute the build command.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let mut config = KilnConfig::load(args.config.as_deref())?;
    config.apply_build_args(&args);
    config.validate()?;

    let root = resolve_target(&config.project_root(), &[] as &[&Path])?;
    let mut bundler = Bundler::new(config.to_build_config(&root));
    for plugin in config.build_plugins() {
        bundler.register(plugin);
    }

    if args.watch {
        watch_and_rebuild(&config, &bundler, &root, args.poll).await
    } else {
        run_pass(&bundler)
    }
}

/// Run one pass and print its summary.
fn run_pass(bundler: &Bundler) -> Result<()> {
    let start = Instant::now();
    ui::info(&format!(
        "Building: {}",
        bundler.config().entry.display()
    ));

    let report = bundler.build()?;

    let entries: Vec<(String, u64)> = report
        .files
        .iter()
        .map(|(name, size)| (name.clone(), *size as u64))
        .collect();
    ui::print_build_summary(&entries, start.elapsed());
    ui::success(&format!(
        "Bundled {} modules to {}",
        report.module_count,
        report.out_dir.display()
    ));
    Ok(())
}

/// Initial pass, then rebuild on change until interrupted.
async fn watch_and_rebuild(
    config: &KilnConfig,
    bundler: &Bundler,
    root: &Path,
    poll: bool,
) -> Result<()> {
    // A failed initial pass is reported but keeps the watcher alive, same as
    // any later pass.
    if let Err(e) = run_pass(bundler) {
        ui::error(&e.to_string());
    }

    let ignore = ignore_patterns(config);
    let window = Duration::from_millis(config.watch.debounce_ms);

    // The notify watcher must stay alive for the whole loop.
    let _watcher;
    let events = if poll {
        ui::info("Watching for changes (polling)...");
        watch::PollWatcher::spawn(
            root.to_path_buf(),
            ignore,
            Duration::from_millis(config.watch.poll_interval_ms),
        )?
    } else {
        ui::info("Watching for changes...");
        let (watcher, events) = watch::FileWatcher::new(root.to_path_buf(), ignore)?;
        _watcher = watcher;
        events
    };

    watch::run_loop(events, window, || match run_pass(bundler) {
        Ok(()) => true,
        Err(e) => {
            ui::error(&e.to_string());
            false
        }
    })
    .await
}

/// Paths the watcher must not react to: the output directory, dependency
/// trees, and the wasm artifact directory the compiler rewrites every pass.
fn ignore_patterns(config: &KilnConfig) -> Vec<String> {
    let mut patterns = vec![
        config.out_dir.to_string_lossy().into_owned(),
        "node_modules".to_string(),
        "target".to_string(),
    ];
    if let Some(wasm) = &config.wasm {
        patterns.push(wasm.artifact_dir.clone());
    }
    patterns
}
