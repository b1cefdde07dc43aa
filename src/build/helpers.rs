// helpers.rs - Build status output

use colored::Colorize;

/// Echo info message
pub fn einfo(message: &str) {
    println!(" {} {}", "*".green(), message);
}

/// Echo warning message
pub fn ewarn(message: &str) {
    eprintln!(" {} {}", "*".yellow(), message);
}

/// Echo error message
pub fn eerror(message: &str) {
    eprintln!(" {} {}", "*".red(), message);
}

/// Begin an operation
pub fn ebegin(message: &str) {
    print!(" {} {} ...", "*".green(), message);
    std::io::Write::flush(&mut std::io::stdout()).ok();
}

/// End an operation
pub fn eend(exit_code: i32) {
    if exit_code == 0 {
        println!(" {}", "[ ok ]".green());
    } else {
        println!(" {}", "[ !! ]".red());
    }
}
