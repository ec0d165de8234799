fn main() {
    if let Err(e) = medguard_lib::run() {
        eprintln!("medguard: {e}");
        std::process::exit(1);
    }
}
