fn main() {
    if let Err(e) = lyra_pointer::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
