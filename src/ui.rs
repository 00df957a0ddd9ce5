#[macro_export]
macro_rules! warning {
    ($msg:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", $msg.yellow());
    }};
    ($fmt:expr, $($arg:tt)*) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let msg = format!($fmt, $($arg)*);
        let _ = writeln!(io::stderr(), "{}", msg.yellow());
    }};
}

#[macro_export]
macro_rules! error {
    ($msg:expr) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let _ = writeln!(io::stderr(), "{}", $msg.red());
    }};
    ($fmt:expr, $($arg:tt)*) => {{
        use colored::Colorize;
        use std::io::{self, Write};
        let msg = format!($fmt, $($arg)*);
        let _ = writeln!(io::stderr(), "{}", msg.red());
    }};
}
