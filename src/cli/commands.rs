//! Command dispatch: load scene and settings, run the service, report counts.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands, OutputArgs, SelectionArgs};
use crate::cli::output;
use crate::cli::tree::skeleton_tree;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{BindingRequest, ObjectId, Scene, TraversalMode};
use crate::infrastructure::{InfraError, ServiceContainer};

/// Services plus the scene loaded for one command.
struct Session {
    container: ServiceContainer,
    scene_path: PathBuf,
    scene: Scene,
}

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Apply { selection, output }) => cmd_apply(cli, selection, output),
        Some(Commands::Remove {
            scene,
            targets,
            output,
        }) => cmd_remove(cli, scene.as_deref(), targets, output),
        Some(Commands::Pairs { selection }) => cmd_pairs(cli, selection),
        Some(Commands::Tree { scene, object }) => cmd_tree(cli, scene.as_deref(), object.as_deref()),
        Some(Commands::Selection { scene }) => cmd_selection(cli, scene.as_deref()),
        Some(Commands::Config { command }) => cmd_config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "bonetree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, run `bonetree --help`".to_string(),
        )),
    }
}

/// Directory whose `.bonetree.toml` applies: `-C` wins, else the scene file's directory.
fn config_dir(cli: &Cli, scene: Option<&Path>) -> Option<PathBuf> {
    cli.scene_dir.clone().or_else(|| {
        scene
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
    })
}

fn load_settings(cli: &Cli, scene: Option<&Path>) -> CliResult<Settings> {
    let dir = config_dir(cli, scene);
    Ok(Settings::load(dir.as_deref())?)
}

fn open(cli: &Cli, scene_arg: Option<&Path>) -> CliResult<Session> {
    let settings = load_settings(cli, scene_arg)?;
    let scene_path = scene_arg
        .map(Path::to_path_buf)
        .or_else(|| settings.scene.clone())
        .ok_or_else(|| {
            CliError::Usage("no scene file given and no `scene` setting configured".to_string())
        })?;

    let container = ServiceContainer::new(settings);
    let scene = container.load_scene(&scene_path)?;
    Ok(Session {
        container,
        scene_path,
        scene,
    })
}

fn lookup_all(scene: &Scene, names: &[String]) -> CliResult<Vec<ObjectId>> {
    names
        .iter()
        .map(|n| scene.lookup(n).map_err(CliError::from))
        .collect()
}

/// Starts from the scene selection, then lets explicit flags override each part.
fn build_request(scene: &Scene, args: &SelectionArgs, default_mode: TraversalMode) -> CliResult<BindingRequest> {
    let mode = args.mode.map(TraversalMode::from).unwrap_or(default_mode);
    let mut request = BindingRequest::from_scene_selection(scene, mode);

    if let Some(name) = &args.source {
        request.set_source(scene, scene.lookup(name)?)?;
    }
    if !args.targets.is_empty() {
        request.clear_targets();
        for id in lookup_all(scene, &args.targets)? {
            request.add_target(scene, id)?;
        }
    }
    match args.root.as_deref() {
        Some("") => {
            return Err(CliError::InvalidArgs(
                "root bone name cannot be empty".to_string(),
            ))
        }
        Some(root) => request.set_root_bone(root),
        None => request.default_root_from_targets(scene),
    }
    debug!("request: {:?}", request);
    Ok(request)
}

/// Saves the scene when asked to, either explicitly or via `write_back`.
fn finish(session: &Session, out: &OutputArgs) -> CliResult<()> {
    let target = match &out.output {
        Some(path) => Some(path.clone()),
        None if out.write || session.container.settings.write_back => Some(session.scene_path.clone()),
        None => None,
    };
    match target {
        Some(path) => {
            session.container.save_scene(&path, &session.scene)?;
            output::action("Saved", &path.display());
        }
        None => output::detail(&"scene not saved (use --write or --output)"),
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_apply(cli: &Cli, args: &SelectionArgs, out: &OutputArgs) -> CliResult<()> {
    let mut session = open(cli, args.scene.as_deref())?;
    let request = build_request(&session.scene, args, session.container.settings.mode)?;

    let report = session
        .container
        .bindings
        .apply(&mut session.scene, &request)?;

    for t in &report.per_target {
        output::success_detail(&format!("{}: {}", t.name, t.count));
    }
    output::success(&format!("Total constraints added: {}", report.total));
    finish(&session, out)
}

#[instrument(skip(cli))]
fn cmd_remove(cli: &Cli, scene: Option<&Path>, targets: &[String], out: &OutputArgs) -> CliResult<()> {
    let mut session = open(cli, scene)?;
    let mut request = BindingRequest::from_scene_selection(&session.scene, TraversalMode::default());
    if !targets.is_empty() {
        request.clear_targets();
        for id in lookup_all(&session.scene, targets)? {
            request.add_target(&session.scene, id)?;
        }
    }

    let report = session
        .container
        .bindings
        .remove(&mut session.scene, &request)?;

    for t in &report.per_target {
        output::success_detail(&format!("{}: {}", t.name, t.count));
    }
    output::success(&format!(
        "Removed {} Copy Transforms constraints.",
        report.total
    ));
    finish(&session, out)
}

#[instrument(skip(cli))]
fn cmd_pairs(cli: &Cli, args: &SelectionArgs) -> CliResult<()> {
    let session = open(cli, args.scene.as_deref())?;
    let request = build_request(&session.scene, args, session.container.settings.mode)?;

    let previews = session.container.bindings.preview(&session.scene, &request)?;
    let mut total = 0;
    for preview in &previews {
        output::header(&format!("{} ({})", preview.name, request.mode));
        for pair in &preview.pairs {
            output::detail(pair);
        }
        total += preview.pairs.len();
    }
    output::info(&format!("{} pairs", total));
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_tree(cli: &Cli, scene: Option<&Path>, object: Option<&str>) -> CliResult<()> {
    let session = open(cli, scene)?;
    let scene = &session.scene;

    let ids: Vec<ObjectId> = match object {
        Some(name) => vec![scene.lookup(name)?],
        None => scene.ids().filter(|&id| scene.is_armature(id)).collect(),
    };
    if ids.is_empty() {
        output::warning(&"no armatures in scene");
    }
    for id in ids {
        let skeleton = scene.armature(id)?;
        output::info(&skeleton_tree(scene, skeleton));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_selection(cli: &Cli, scene: Option<&Path>) -> CliResult<()> {
    let session = open(cli, scene)?;
    let scene = &session.scene;
    let mut request = BindingRequest::from_scene_selection(scene, session.container.settings.mode);
    request.default_root_from_targets(scene);

    let name = |id: ObjectId| scene.name_of(id).unwrap_or("<unknown>").to_string();
    output::header(&"Parent Armature:");
    output::detail(&request.source().map(name).unwrap_or_else(|| "None".into()));
    output::header(&"Child Armatures:");
    if request.targets().is_empty() {
        output::detail(&"None");
    }
    for &t in request.targets() {
        output::detail(&name(t));
    }
    output::header(&"Root Bone:");
    output::detail(&request.root_bone().unwrap_or("None"));
    output::header(&"Traversal Mode:");
    output::detail(&request.mode);

    if let Err(e) = request.validate(scene) {
        output::warning(&format!("Complete all selections to apply: {}", e));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn cmd_config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = load_settings(cli, None)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                let dir = match &cli.scene_dir {
                    Some(dir) => dir.clone(),
                    None => std::env::current_dir()
                        .map_err(|e| InfraError::io("current directory", e))?,
                };
                local_config_path(&dir)
            };
            let container = ServiceContainer::new(Settings::default());
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            container
                .fs
                .ensure_parent(&path)
                .and_then(|_| container.fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("Global", &p.display()),
                None => output::warning(&"cannot determine global config directory"),
            }
            if let Some(dir) = config_dir(cli, None) {
                output::action("Local", &local_config_path(&dir).display());
            }
        }
    }
    Ok(())
}
