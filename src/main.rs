fn main() {
    if let Err(err) = sticky_grid::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
