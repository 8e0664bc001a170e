fn main() {
    if let Err(e) = labscan::run() {
        eprintln!("labscan: {e}");
        std::process::exit(1);
    }
}
