/// Display version information
pub fn execute() {
    println!("proposals-codec {}", env!("CARGO_PKG_VERSION"));
    println!("SCALE codec and type registry for proposals pallet storage");
}
