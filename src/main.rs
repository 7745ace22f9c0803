//! Host-side dev helper: `cargo run` builds the wasm bundle into
//! `static/pkg` and serves `static/` on localhost.

#[cfg(not(target_arch = "wasm32"))]
use std::process::{Command, ExitCode, Stdio};

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8000".into());

    log::info!("building wasm bundle");
    match Command::new("wasm-pack")
        .args(["build", "--release", "--target", "web", "--out-dir", "static/pkg"])
        .status()
    {
        Ok(st) if st.success() => {}
        Ok(st) => {
            log::error!("wasm-pack exited with {st}");
            return ExitCode::FAILURE;
        }
        Err(e) => log::warn!("wasm-pack unavailable ({e}); serving whatever is in static/pkg"),
    }

    log::info!("serving static/ at http://127.0.0.1:{port}");
    let server = Command::new("python3")
        .args(["-m", "http.server", &port, "--directory", "static"])
        .stdout(Stdio::null())
        .stderr(Stdio::inherit())
        .status();
    match server {
        Ok(st) if st.success() => ExitCode::SUCCESS,
        Ok(st) => {
            log::error!("http server exited with {st}");
            ExitCode::FAILURE
        }
        Err(e) => {
            log::error!("cannot start http server: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}
