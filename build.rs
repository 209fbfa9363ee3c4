fn main() {
    // --long-version carries the commit hash when built from a checkout.
    let hash = std::process::Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok());
    if let Some(hash) = hash {
        println!("cargo:rustc-env=NEONCAP_GIT_HASH={}", hash.trim());
    }
}
