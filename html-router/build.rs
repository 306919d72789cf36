fn main() {
    // Get the build profile ("debug" or "release")
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "debug".to_string());

    // Templates are read from disk with autoreload in debug builds
    if profile == "release" {
        minijinja_embed::embed_templates!("templates");
    } else {
        println!("cargo:info=Build: Skipping template embedding for debug build.");
    }
}
