//! `pfar` — a thin command-line front end over the paged archive container
//! library, demonstrating the engine end to end. Grounded in `PFArchiver`
//! (`original_source/src/src/main.cpp`), reimplemented with `clap` for
//! argument parsing, `walkdir` for directory traversal, and `anyhow` for
//! top-level error reporting in place of Boost.ProgramOptions/filesystem.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use pfar::{CompressionKind, Container, OpenMode, PageFormat, PageKind};

#[derive(Parser)]
#[command(name = "pfar", about = "Paged archive file engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add files and directories to an archive, creating it if needed.
    Pack {
        archive: PathBuf,
        /// Files or directories to add.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Compress file contents with LZ4.
        #[arg(short, long)]
        compress: bool,
        /// Recurse into subdirectories.
        #[arg(short, long)]
        recurse: bool,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Extract an archive's contents into a directory.
    Unpack {
        archive: PathBuf,
        /// Destination directory (created if missing).
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
        /// Only extract entries whose name starts with this prefix.
        #[arg(short, long)]
        prefix: Option<String>,
        #[arg(short, long)]
        verbose: bool,
    },
    /// List an archive's entries.
    List {
        archive: PathBuf,
        #[arg(short, long)]
        prefix: Option<String>,
    },
    /// Remove named entries from an archive and compact it.
    Rm {
        archive: PathBuf,
        #[arg(required = true)]
        names: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Pack {
            archive,
            inputs,
            compress,
            recurse,
            verbose,
        } => pack(&archive, &inputs, compress, recurse, verbose),
        Command::Unpack {
            archive,
            output,
            prefix,
            verbose,
        } => unpack(&archive, &output, prefix.as_deref(), verbose),
        Command::List { archive, prefix } => list(&archive, prefix.as_deref()),
        Command::Rm { archive, names } => remove(&archive, &names),
    }
}

struct Entry {
    absolute_path: PathBuf,
    relative_path: String,
    is_dir: bool,
}

fn collect_files(root: &Path, recurse: bool) -> Result<Vec<Entry>> {
    let root = fs::canonicalize(root).with_context(|| format!("{} not found", root.display()))?;
    let mut entries = Vec::new();

    if root.is_file() {
        let name = root.file_name().unwrap().to_string_lossy().into_owned();
        entries.push(Entry {
            absolute_path: root,
            relative_path: name,
            is_dir: false,
        });
        return Ok(entries);
    }

    let base = root.parent().unwrap_or(&root).to_path_buf();
    if !recurse {
        let relative = root
            .strip_prefix(&base)
            .unwrap_or(&root)
            .to_string_lossy()
            .replace('\\', "/");
        entries.push(Entry {
            absolute_path: root,
            relative_path: relative,
            is_dir: true,
        });

        return Ok(entries);
    }

    let walker = walkdir::WalkDir::new(&root)
        .sort_by(|a, b| a.file_name().cmp(b.file_name()));
    for walked in walker {
        let walked = walked?;
        let relative = walked
            .path()
            .strip_prefix(&base)
            .unwrap_or(walked.path())
            .to_string_lossy()
            .replace('\\', "/");
        entries.push(Entry {
            absolute_path: walked.path().to_path_buf(),
            relative_path: relative,
            is_dir: walked.file_type().is_dir(),
        });
    }
    Ok(entries)
}

fn pack(
    archive: &Path,
    inputs: &[PathBuf],
    compress: bool,
    recurse: bool,
    verbose: bool,
) -> Result<()> {
    let mut entries = Vec::new();
    for input in inputs {
        match collect_files(input, recurse) {
            Ok(found) => entries.extend(found),
            Err(e) => eprintln!("error: {e}"),
        }
    }

    let opening = if archive.exists() {
        OpenMode::ReadWrite
    } else {
        OpenMode::Create
    };
    let mut container = Container::open(archive, opening)
        .with_context(|| format!("failed to open archive {}", archive.display()))?;

    let idx_shift = if opening == OpenMode::ReadWrite {
        container.header().list_pages().iter().max().map_or(0, |m| m + 1)
    } else {
        0
    };

    for (i, entry) in entries.iter().enumerate() {
        let idx = i as u32 + idx_shift;
        if entry.is_dir {
            if verbose {
                println!("{} [dir]", entry.absolute_path.display());
            }
            container.new_meta_page(
                idx,
                PageFormat::new(PageKind::Directory, CompressionKind::Plain),
                entry.relative_path.clone(),
            )?;
            continue;
        }

        let content = match fs::read(&entry.absolute_path) {
            Ok(bytes) => bytes,
            Err(_) => continue,
        };
        if verbose {
            println!("{}", entry.absolute_path.display());
        }

        if compress {
            let kind = pfar::container::codec::choose_format(content.len() as u64);
            let format = PageFormat::new(PageKind::File, kind);
            container.append_page(idx, entry.relative_path.clone(), format, &content)?;
        } else {
            let format = PageFormat::new(PageKind::File, CompressionKind::Plain);
            container.append_page(idx, entry.relative_path.clone(), format, &content)?;
        }
    }

    container.close(true)?;
    println!("Done.");
    Ok(())
}

fn unpack(archive: &Path, output: &Path, prefix: Option<&str>, verbose: bool) -> Result<()> {
    if !archive.is_file() {
        bail!("archive does not exist: {}", archive.display());
    }
    fs::create_dir_all(output)
        .with_context(|| format!("failed to create output directory {}", output.display()))?;
    let output = fs::canonicalize(output)?;

    let mut container = Container::open(archive, OpenMode::ReadOnly)
        .map_err(|_| anyhow::anyhow!("failed to load archive. Corrupted?"))?;

    let ids = match prefix {
        Some(p) => container.header().list_pages_with_prefix(p),
        None => container.header().list_pages().to_vec(),
    };

    for &id in &ids {
        let desc = container.header().desc(id).expect("id from list_pages");
        if desc.format.kind() != PageKind::Directory {
            continue;
        }
        let path = output.join(&desc.name);
        if verbose {
            println!("folder: {}", path.display());
        }
        fs::create_dir_all(&path).with_context(|| format!("failed to create {}", path.display()))?;
    }

    for &id in &ids {
        let desc = container.header().desc(id).expect("id from list_pages").clone();
        if desc.format.kind() != PageKind::File {
            continue;
        }
        let path = output.join(&desc.name);
        if verbose {
            println!("extract file: {}", path.display());
        }

        let view = container.create_page_view(id)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, view_bytes(view))
            .with_context(|| format!("failed to write to {}", path.display()))?;
    }

    container.close(false).ok();
    println!("Done.");
    Ok(())
}

fn view_bytes(mut view: pfar::PageView) -> Vec<u8> {
    use std::io::Read;
    let mut buf = Vec::with_capacity(view.len());
    view.read_to_end(&mut buf).expect("PageView reads are infallible over owned memory");
    buf
}

fn list(archive: &Path, prefix: Option<&str>) -> Result<()> {
    if !archive.is_file() {
        bail!("archive does not exist: {}", archive.display());
    }
    let container = Container::open(archive, OpenMode::ReadOnly)
        .map_err(|_| anyhow::anyhow!("failed to load archive. Corrupted?"))?;

    let ids = match prefix {
        Some(p) => container.header().list_pages_with_prefix(p),
        None => container.header().list_pages().to_vec(),
    };

    for id in ids {
        let desc = container.header().desc(id).expect("id from list_pages");
        match desc.format.kind() {
            PageKind::Directory => println!("{} [dir]", desc.name),
            PageKind::File => {
                if desc.format.is_compressed() {
                    let pct = (desc.length as f64 / desc.uncompressed_length.max(1) as f64) * 100.0;
                    println!(
                        "{}\t({}/{} {:.0}%)",
                        desc.name, desc.length, desc.uncompressed_length, pct
                    );
                } else {
                    println!("{}\t({})", desc.name, desc.length);
                }
            }
            PageKind::SymLink => println!("{} [symlink]", desc.name),
            PageKind::HardLink => println!("{} [hardlink]", desc.name),
        }
    }

    container.close(false).ok();
    Ok(())
}

fn remove(archive: &Path, names: &[String]) -> Result<()> {
    if !archive.is_file() {
        bail!("archive does not exist: {}", archive.display());
    }
    let mut container = Container::open(archive, OpenMode::ReadWrite)
        .map_err(|_| anyhow::anyhow!("failed to load archive. Corrupted?"))?;

    let to_delete: Vec<u32> = container
        .header()
        .list_pages()
        .iter()
        .copied()
        .filter(|&id| {
            container
                .header()
                .desc(id)
                .map_or(false, |d| names.iter().any(|n| n == &d.name))
        })
        .collect();

    if !to_delete.is_empty() {
        container.remove_pages(&to_delete)?;
    }

    container.close(true)?;
    Ok(())
}
