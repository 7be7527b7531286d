fn main() {
    if let Err(err) = techtree_rs_renderer::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
