use std::path::{Path, PathBuf};

const LIB_DIRS: &[&str] = &[
    "/opt/homebrew/lib",
    "/usr/local/lib",
    "/usr/lib",
    "/usr/lib64",
    "/usr/lib/x86_64-linux-gnu",
    "/usr/lib/aarch64-linux-gnu",
];

fn has_portaudio(dir: &Path) -> bool {
    ["libportaudio.so", "libportaudio.dylib", "libportaudio.a", "portaudio.lib"]
        .iter()
        .any(|name| dir.join(name).exists())
}

fn main() {
    println!("cargo::rustc-check-cfg=cfg(portaudio_linked)");
    println!("cargo:rerun-if-env-changed=PORTAUDIO_LIB_DIR");

    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Ok(dir) = std::env::var("PORTAUDIO_LIB_DIR") {
        dirs.push(PathBuf::from(dir));
    }
    dirs.extend(LIB_DIRS.iter().map(PathBuf::from));

    match dirs.iter().find(|d| has_portaudio(d)) {
        Some(dir) => {
            println!("cargo:rustc-link-search=native={}", dir.display());
            println!("cargo:rustc-link-lib=portaudio");
            println!("cargo:rustc-cfg=portaudio_linked");
        }
        None => {
            println!("cargo:warning=libportaudio not found; audio devices will be unavailable");
        }
    }
}
