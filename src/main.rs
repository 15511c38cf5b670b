fn main() {
    if let Err(err) = stamp_renderer::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
