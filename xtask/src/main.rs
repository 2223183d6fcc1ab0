use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use cavern_assets::load_obj;
use cavern_collision::CollisionMesh;
use cavern_nav::NavGraph;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "xtask", about = "Build, lint and level checks for the cavern workspace")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// fmt, clippy, tests, docs, then mesh lint and CLI smoke run
    Ci,
    /// Run one cargo step by name (fmt, clippy, test, doc)
    Cargo { step: String },
    /// Load every .obj under the given paths and check it as collision and navigation input
    Meshes {
        #[arg(default_value = "assets/caves")]
        paths: Vec<PathBuf>,
        /// Also fail on degenerate triangles and edges
        #[arg(long)]
        strict: bool,
    },
    /// Run `cavern-cli demo` with and without a blocked corridor cell
    Smoke,
    /// Run the navigation benchmarks
    Bench,
}

/// Cargo invocations shared by `ci` and `cargo <step>`.
const CARGO_STEPS: &[(&str, &[&str])] = &[
    ("fmt", &["fmt", "--all", "--", "--check"]),
    (
        "clippy",
        &["clippy", "--workspace", "--all-targets", "--", "-D", "warnings"],
    ),
    ("test", &["test", "--workspace"]),
    ("doc", &["doc", "--workspace", "--no-deps"]),
];

fn main() -> Result<()> {
    match Cli::parse().command {
        Commands::Ci => {
            for (name, _) in CARGO_STEPS {
                cargo_step(name)?;
            }
            lint_meshes(&[PathBuf::from("assets/caves")], false)?;
            smoke()?;
        }
        Commands::Cargo { step } => cargo_step(&step)?,
        Commands::Meshes { paths, strict } => lint_meshes(&paths, strict)?,
        Commands::Smoke => smoke()?,
        Commands::Bench => cargo(&["bench", "-p", "cavern-nav", "--bench", "bench_pathfinding"])?,
    }
    Ok(())
}

fn cargo_step(name: &str) -> Result<()> {
    let Some((_, args)) = CARGO_STEPS.iter().find(|(n, _)| *n == name) else {
        let known: Vec<&str> = CARGO_STEPS.iter().map(|(n, _)| *n).collect();
        bail!("unknown step {name:?}, expected one of {}", known.join(", "));
    };
    cargo(args)
}

fn cargo(args: &[&str]) -> Result<()> {
    println!("==> cargo {}", args.join(" "));
    let status = Command::new("cargo").args(args).status()?;
    if !status.success() {
        bail!("cargo {} failed", args[0]);
    }
    Ok(())
}

/// Run the CLI and return its stdout, failing on a non-zero exit.
fn cavern_cli(args: &[&str]) -> Result<String> {
    println!("==> cavern-cli {}", args.join(" "));
    let output = Command::new("cargo")
        .args(["run", "-q", "-p", "cavern-cli", "--"])
        .args(args)
        .output()?;
    if !output.status.success() {
        bail!(
            "cavern-cli {} exited with {}:\n{}",
            args.join(" "),
            output.status,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn smoke() -> Result<()> {
    let open = cavern_cli(&["demo", "--cells", "6"])?;
    if !open.contains("route: 0 -> 1 -> 2 -> 3 -> 4 -> 5") || !open.contains("arrived at") {
        bail!("open corridor demo did not walk the full route:\n{open}");
    }

    let blocked = cavern_cli(&["demo", "--cells", "6", "--block", "2"])?;
    if !blocked.contains("no path") {
        bail!("blocked corridor demo still found a route:\n{blocked}");
    }
    println!("smoke: ok");
    Ok(())
}

fn collect_objs(path: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    if path.is_dir() {
        let mut entries = std::fs::read_dir(path)
            .with_context(|| format!("reading {}", path.display()))?
            .collect::<std::io::Result<Vec<_>>>()?;
        entries.sort_by_key(|e| e.path());
        for entry in entries {
            collect_objs(&entry.path(), out)?;
        }
    } else if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("obj")) {
        out.push(path.to_path_buf());
    }
    Ok(())
}

fn lint_meshes(paths: &[PathBuf], strict: bool) -> Result<()> {
    let mut files = Vec::new();
    for path in paths {
        collect_objs(path, &mut files)?;
    }
    if files.is_empty() {
        bail!("no .obj files found");
    }

    let mut problems = 0;
    for file in &files {
        let mesh = load_obj(file).with_context(|| format!("loading {}", file.display()))?;
        let collision = CollisionMesh::from_triangles(mesh.triangles());
        let quads = mesh.quads();
        let (graph, report) = NavGraph::build_with_report(&quads);
        let isolated = graph.cells().iter().filter(|c| c.neighbors().is_empty()).count();

        println!(
            "{}: {} triangles ({} rejected), {} nav cells ({} isolated), edges {} shared / {} boundary / {} non-manifold / {} degenerate",
            file.display(),
            collision.len(),
            collision.rejected_count(),
            graph.len(),
            isolated,
            report.shared_edges,
            report.boundary_edges,
            report.non_manifold_edges,
            report.degenerate_edges,
        );

        if report.non_manifold_edges > 0 {
            println!("  error: non-manifold navigation edges");
            problems += 1;
        }
        if strict && (collision.rejected_count() > 0 || report.degenerate_edges > 0) {
            println!("  error: degenerate geometry");
            problems += 1;
        }
    }

    if problems > 0 {
        bail!("{problems} mesh problem(s) in {} file(s)", files.len());
    }
    println!("meshes: {} file(s) ok", files.len());
    Ok(())
}
