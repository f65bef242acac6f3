//! List commands implementation

use crate::programmers;

/// List all supported programmers
pub fn list_programmers() {
    print!("{}", programmers::programmer_help());
    println!();
    println!("Options are given after the name, e.g.:");
    println!("  fernvale probe -p fernvale_spi:dev=/dev/ttyUSB0");
}
