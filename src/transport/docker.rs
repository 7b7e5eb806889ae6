//! Docker CLI transport.
//!
//! Volume contents are reached through a throw-away helper container
//! (`docker run --rm -v <vol>:/data <helper> ...`). The tar stream crosses the
//! process boundary uncompressed and is gzipped/gunzipped on the host with flate2,
//! so the snapshot directory never has to be bind-mounted into a container.
//!
//! Helper image: `alpine`, or ENV DATACLEAN_HELPER_IMAGE.

use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::thread;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::{debug, warn};

use crate::consts::{DEFAULT_HELPER_IMAGE, ENV_HELPER_IMAGE};
use crate::error::{Error, Result};
use crate::models::Volume;

use super::{container_names, ArchiveTransport, Step};

#[derive(Debug, Clone)]
pub struct DockerTransport {
    binary: String,
    helper_image: String,
}

impl DockerTransport {
    /// Check that the docker CLI is reachable and talks to a daemon.
    pub fn connect() -> Result<Self> {
        let helper_image = std::env::var(ENV_HELPER_IMAGE)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_HELPER_IMAGE.to_string());
        let t = Self {
            binary: "docker".to_string(),
            helper_image,
        };
        let version = t
            .run(&["version", "--format", "{{.Server.Version}}"])
            .map_err(Error::TransportUnavailable)?;
        debug!("docker: server version {}", version.trim());
        Ok(t)
    }

    pub fn helper_image(&self) -> &str {
        &self.helper_image
    }

    fn command(&self) -> Command {
        Command::new(&self.binary)
    }

    /// Run to completion; Ok(stdout) or Err(reason with stderr).
    fn run(&self, args: &[&str]) -> std::result::Result<String, String> {
        let out = self
            .command()
            .args(args)
            .output()
            .map_err(|e| format!("spawn {}: {}", self.binary, e))?;
        if out.status.success() {
            Ok(String::from_utf8_lossy(&out.stdout).into_owned())
        } else {
            Err(format!(
                "{} {}: {}",
                self.binary,
                args.first().copied().unwrap_or(""),
                String::from_utf8_lossy(&out.stderr).trim()
            ))
        }
    }

    /// `docker run --rm [-i] -v <vol>:/data[:ro] <helper> <cmd...>`
    fn helper_args(&self, volume: &Volume, read_only: bool, interactive: bool, cmd: &[&str]) -> Vec<String> {
        let mut args = vec!["run".to_string(), "--rm".to_string()];
        if interactive {
            args.push("-i".to_string());
        }
        args.push("-v".to_string());
        args.push(format!(
            "{}:/data{}",
            volume.name,
            if read_only { ":ro" } else { "" }
        ));
        args.push(self.helper_image.clone());
        args.extend(cmd.iter().map(|s| s.to_string()));
        args
    }

    fn each_container(&self, volumes: &[Volume], verb: &str) -> Step<()> {
        let mut failures = Vec::new();
        for name in container_names(volumes) {
            debug!("docker: {} {}", verb, name);
            if let Err(e) = self.run(&[verb, name]) {
                warn!("docker: {} {} failed (ignored): {}", verb, name, e);
                failures.push(format!("{name}: {e}"));
            }
        }
        if failures.is_empty() {
            Step::Succeeded(())
        } else {
            Step::Ignored(failures.join("; "))
        }
    }
}

// Drain stderr on a side thread so a chatty helper cannot block the data pipe.
fn collect_stderr(child: &mut Child) -> thread::JoinHandle<String> {
    let stderr = child.stderr.take();
    thread::spawn(move || {
        let mut s = String::new();
        if let Some(mut e) = stderr {
            let _ = e.read_to_string(&mut s);
        }
        s
    })
}

fn finish(mut child: Child, stderr: thread::JoinHandle<String>) -> std::result::Result<(), String> {
    let status = child.wait().map_err(|e| format!("wait helper: {e}"))?;
    let err_text = stderr.join().unwrap_or_default();
    if status.success() {
        Ok(())
    } else {
        Err(format!("helper exited with {}: {}", status, err_text.trim()))
    }
}

impl ArchiveTransport for DockerTransport {
    fn export_volume(&self, volume: &Volume, dest: &Path) -> Result<()> {
        let fail = |reason: String| Error::Export {
            volume: volume.name.clone(),
            reason,
        };
        // destination first: no helper is spawned if it cannot be created
        let file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(dest)
            .map_err(|e| fail(format!("open {}: {}", dest.display(), e)))?;
        let args = self.helper_args(volume, true, false, &["tar", "cf", "-", "-C", "/data", "."]);
        let mut child = self
            .command()
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(format!("spawn {}: {}", self.binary, e)))?;
        let stderr = collect_stderr(&mut child);
        let mut enc = GzEncoder::new(BufWriter::new(file), Compression::default());

        let copied = match child.stdout.take() {
            Some(mut out) => io::copy(&mut out, &mut enc),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "helper stdout not captured")),
        };
        let finished = finish(child, stderr).map_err(&fail);
        let copied = copied.map_err(|e| fail(format!("stream tar: {e}")))?;
        finished?;
        let mut w = enc.finish().map_err(|e| fail(format!("gzip finish: {e}")))?;
        w.flush().map_err(|e| fail(format!("flush {}: {}", dest.display(), e)))?;
        debug!("docker: exported {} ({} tar bytes) -> {}", volume.name, copied, dest.display());
        Ok(())
    }

    fn import_volume(&self, src: &Path, volume: &Volume) -> Result<()> {
        let fail = |reason: String| Error::Import {
            volume: volume.name.clone(),
            reason,
        };
        let file = File::open(src).map_err(|e| fail(format!("open {}: {}", src.display(), e)))?;

        self.clear_volume(volume).map_err(|e| fail(e.to_string()))?;

        let args = self.helper_args(volume, false, true, &["tar", "xf", "-", "-C", "/data"]);
        let mut child = self
            .command()
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| fail(format!("spawn {}: {}", self.binary, e)))?;
        let stderr = collect_stderr(&mut child);

        let mut dec = GzDecoder::new(BufReader::new(file));
        let copied = match child.stdin.take() {
            // stdin is dropped at the end of this arm so tar sees EOF
            Some(mut input) => io::copy(&mut dec, &mut input),
            None => Err(io::Error::new(io::ErrorKind::BrokenPipe, "helper stdin not captured")),
        };
        let copied = copied.map_err(|e| fail(format!("stream tar: {e}")));
        let finished = finish(child, stderr).map_err(fail);
        let copied = copied?;
        finished?;
        debug!("docker: imported {} ({} tar bytes) <- {}", volume.name, copied, src.display());
        Ok(())
    }

    fn clear_volume(&self, volume: &Volume) -> Result<()> {
        let args = self.helper_args(volume, false, false, &["find", "/data", "-mindepth", "1", "-delete"]);
        let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        self.run(&refs).map(|_| ()).map_err(|reason| Error::Clear {
            volume: volume.name.clone(),
            reason,
        })
    }

    fn volume_size(&self, volume: &Volume) -> Result<u64> {
        let fail = |reason: String| Error::SizeQuery {
            volume: volume.name.clone(),
            reason,
        };
        let args = self.helper_args(volume, true, false, &["du", "-sb", "/data"]);
        let refs: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
        let out = self.run(&refs).map_err(fail)?;
        parse_du_bytes(&out).ok_or_else(|| fail(format!("unexpected du output: {}", out.trim())))
    }

    fn pause_containers(&self, volumes: &[Volume]) -> Step<()> {
        self.each_container(volumes, "stop")
    }

    fn resume_containers(&self, volumes: &[Volume]) -> Step<()> {
        self.each_container(volumes, "start")
    }
}

/// "123456\t/data" -> 123456
fn parse_du_bytes(out: &str) -> Option<u64> {
    out.split_whitespace().next()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DatastoreKind;

    #[test]
    fn du_output_parsing() {
        assert_eq!(parse_du_bytes("4096\t/data\n"), Some(4096));
        assert_eq!(parse_du_bytes("  77 /data"), Some(77));
        assert_eq!(parse_du_bytes(""), None);
        assert_eq!(parse_du_bytes("du: can't open"), None);
    }

    #[test]
    fn export_checks_destination_before_spawning() {
        let t = DockerTransport {
            binary: "/nonexistent/dataclean-docker".into(),
            helper_image: "alpine".into(),
        };
        let v = Volume::new("proj_pgdata", DatastoreKind::Postgres);
        let dest = std::env::temp_dir()
            .join(format!("dataclean-missing-{}", std::process::id()))
            .join("nested")
            .join("proj_pgdata.tar.gz");
        match t.export_volume(&v, &dest) {
            Err(Error::Export { volume, reason }) => {
                assert_eq!(volume, "proj_pgdata");
                assert!(reason.starts_with("open "), "{reason}");
            }
            other => panic!("expected an open failure, got {:?}", other),
        }
    }

    #[test]
    fn helper_args_layout() {
        let t = DockerTransport {
            binary: "docker".into(),
            helper_image: "busybox".into(),
        };
        let v = Volume::new("proj_pgdata", DatastoreKind::Postgres);
        let args = t.helper_args(&v, true, false, &["du", "-sb", "/data"]);
        assert_eq!(
            args,
            vec!["run", "--rm", "-v", "proj_pgdata:/data:ro", "busybox", "du", "-sb", "/data"]
        );
        let args = t.helper_args(&v, false, true, &["tar", "xf", "-"]);
        assert_eq!(&args[..5], &["run", "--rm", "-i", "-v", "proj_pgdata:/data"]);
    }
}
