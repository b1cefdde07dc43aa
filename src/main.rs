use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Arg, ArgMatches, Command};

use jpegturbo_recipe::build::helpers::eerror;
use jpegturbo_recipe::options;
use jpegturbo_recipe::platform::{BuildType, TargetDescriptor};
use jpegturbo_recipe::recipe::{DEFAULT_VERSION, Recipe};

#[tokio::main]
async fn main() {
    env_logger::init();

    let app = create_app();
    let matches = app.get_matches();

    let result = run(matches).await;
    process::exit(result);
}

fn create_app() -> Command {
    Command::new("jpegturbo-recipe")
        .version("0.1.0")
        .about("Builds and packages libjpeg-turbo for a target toolchain")
        .arg(
            Arg::new("compiler")
                .long("compiler")
                .help("Compiler identity (gcc, clang, msvc, emcc, ...)")
                .required(true),
        )
        .arg(
            Arg::new("compiler-family")
                .long("compiler-family")
                .help("Compiler family when identity alone is ambiguous (e.g. 'Visual Studio')"),
        )
        .arg(
            Arg::new("target-os")
                .long("target-os")
                .help("Target operating system (linux, macos, windows); may be absent for web builds"),
        )
        .arg(
            Arg::new("arch")
                .long("arch")
                .help("Target CPU architecture"),
        )
        .arg(
            Arg::new("build-type")
                .long("build-type")
                .value_parser(["debug", "release"])
                .default_value("release")
                .help("Build configuration"),
        )
        .arg(
            Arg::new("option")
                .long("option")
                .short('o')
                .action(clap::ArgAction::Append)
                .help("Override a build option as name=value (repeatable)"),
        )
        .arg(
            Arg::new("options-file")
                .long("options-file")
                .help("JSON file of option overrides, merged before --option"),
        )
        .arg(
            Arg::new("source-version")
                .long("source-version")
                .default_value(DEFAULT_VERSION)
                .help("Upstream libjpeg-turbo version the work root was extracted from"),
        )
        .arg(
            Arg::new("work-root")
                .long("work-root")
                .default_value(".")
                .help("Directory holding the extracted upstream source"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .required(true)
                .help("Install prefix; becomes the package root"),
        )
        .arg(
            Arg::new("assets-dir")
                .long("assets-dir")
                .default_value("assets")
                .help("Directory with the recipe's CMake wrapper and web helper scripts"),
        )
        .arg(
            Arg::new("pretend")
                .long("pretend")
                .short('p')
                .help("Print the resolved build plan as JSON and exit")
                .action(clap::ArgAction::SetTrue),
        )
}

async fn run(matches: ArgMatches) -> i32 {
    match build(matches).await {
        Ok(()) => 0,
        Err(e) => {
            eerror(&format!("{:#}", e));
            1
        }
    }
}

async fn build(matches: ArgMatches) -> anyhow::Result<()> {
    let build_type = match matches.get_one::<String>("build-type").map(String::as_str) {
        Some("debug") => BuildType::Debug,
        _ => BuildType::Release,
    };

    let target = TargetDescriptor {
        os: matches.get_one::<String>("target-os").cloned(),
        compiler: matches
            .get_one::<String>("compiler")
            .cloned()
            .unwrap_or_default(),
        compiler_family: matches.get_one::<String>("compiler-family").cloned(),
        arch: matches.get_one::<String>("arch").cloned(),
        build_type,
    };

    let mut overrides = BTreeMap::new();
    if let Some(path) = matches.get_one::<String>("options-file") {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("reading options file {}", path))?;
        let from_file: BTreeMap<String, bool> =
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path))?;
        overrides.extend(from_file);
    }
    if let Some(values) = matches.get_many::<String>("option") {
        for value in values {
            let (key, enabled) = options::parse_override(value)?;
            overrides.insert(key, enabled);
        }
    }

    let recipe = Recipe {
        version: matches
            .get_one::<String>("source-version")
            .cloned()
            .unwrap_or_else(|| DEFAULT_VERSION.to_string()),
        target,
        overrides,
        work_root: PathBuf::from(matches.get_one::<String>("work-root").unwrap()),
        package_root: PathBuf::from(matches.get_one::<String>("prefix").unwrap()),
        assets_dir: PathBuf::from(matches.get_one::<String>("assets-dir").unwrap()),
    };

    if matches.get_flag("pretend") {
        let plan = recipe.plan()?;
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    let report = recipe.run().await?;
    println!("packaged libraries: {}", report.libs.join(", "));
    Ok(())
}
