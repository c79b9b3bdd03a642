//! Plugins shipped with brix
//!
//! Builtin plugin modules are linked into the binary and served by a
//! [`StaticImporter`] under `<namespace>.plugins.<name>_plugin`.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use brix_config::DEFAULT_PLUGIN_NAMESPACE;
use brix_graph::{optional, BuildContext, BuildModule};
use brix_plugins::StaticImporter;

use crate::logger;

/// Project property naming the build output directory, relative to basedir
pub const TARGET_DIR_PROPERTY: &str = "dir_target";
const DEFAULT_TARGET_DIR: &str = "target";

/// Builtin plugin names
pub const BUILTIN_PLUGINS: &[&str] = &["core"];

/// Importer serving every builtin plugin under `namespace`
pub fn builtin_importer(namespace: &str) -> StaticImporter {
    let mut importer = StaticImporter::new();
    importer.register(format!("{}.plugins.core_plugin", namespace), core_plugin);
    importer
}

/// Importer for the default namespace
pub fn default_importer() -> StaticImporter {
    builtin_importer(DEFAULT_PLUGIN_NAMESPACE)
}

fn target_dir(context: &BuildContext<'_>) -> PathBuf {
    let project = context.project;
    project.basedir.join(
        project
            .get_property(TARGET_DIR_PROPERTY)
            .unwrap_or(DEFAULT_TARGET_DIR),
    )
}

fn announce(task: &str, context: &BuildContext<'_>) {
    logger::step(&format!(
        "{} {} ({})",
        task,
        context.project.name,
        context.project.basedir.display()
    ));
}

/// The standard build lifecycle
pub fn core_plugin() -> BuildModule {
    let mut module = BuildModule::new("brix.plugins.core_plugin");

    module
        .task("clean", |context| {
            let target = target_dir(context);
            if target.exists() {
                logger::info(&format!("Removing target directory {}", target.display()));
                fs::remove_dir_all(&target)
                    .with_context(|| format!("Failed to remove {}", target.display()))?;
            }
            Ok(())
        })
        .description("Cleans the generated output.");

    let prepare = module
        .task("prepare", |context| {
            let target = target_dir(context);
            fs::create_dir_all(&target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
            Ok(())
        })
        .description("Prepares the project for building.")
        .handle();

    let compile = module
        .task("compile_sources", |context| {
            announce("Compiling sources of", context);
            Ok(())
        })
        .depends_on(&prepare)
        .description("Compiles source files.")
        .handle();

    let unit_tests = module
        .task("run_unit_tests", |context| {
            announce("Running unit tests of", context);
            Ok(())
        })
        .depends_on(&compile)
        .description("Runs all unit tests.")
        .handle();

    let package = module
        .task("package", |context| {
            announce("Packaging", context);
            Ok(())
        })
        .depends_on(&compile)
        .depends_on(optional(&unit_tests))
        .description("Packages the application.")
        .handle();

    let verify = module
        .task("verify", |context| {
            announce("Verifying", context);
            Ok(())
        })
        .depends_on(&package)
        .description("Verifies the project and possibly integration tests.")
        .handle();

    let publish = module
        .task("publish", |context| {
            announce("Publishing", context);
            Ok(())
        })
        .depends_on(&verify)
        .description("Publishes the project.")
        .handle();

    module
        .task("install", |context| {
            announce("Installing", context);
            Ok(())
        })
        .depends_on(&package)
        .depends_on(optional(&publish))
        .description("Installs the published project.");

    module
}
