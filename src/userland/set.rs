/*!
 * set - priority control client
 *
 * `set <pid> <priority>`
 *
 * Only the argument count is checked here. Each argument is read as its
 * leading decimal digits, so `5x` is 5 and `pi` or `-3` is 0; the kernel
 * rejects whatever that yields.
 */

use crate::syscalls::SchedulerSyscalls;
use std::io::Write;

pub const USAGE: &str = "Usage: set <pid> <priority>";
pub const FAILURE: &str = "Error: set failed. Invalid pid or priority.";

/// Program entry. `args[0]` is the program name. Returns the exit status.
pub fn main(args: &[&str], sys: &dyn SchedulerSyscalls, stderr: &mut dyn Write) -> i32 {
    let [_, pid, priority] = args else {
        let _ = writeln!(stderr, "{}", USAGE);
        return 1;
    };

    if sys.set(leading_int(pid), leading_int(priority)) < 0 {
        let _ = writeln!(stderr, "{}", FAILURE);
        return 1;
    }

    0
}

/// Value of the leading run of ASCII digits, 0 if there is none
fn leading_int(arg: &str) -> i32 {
    arg.bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0i32, |n, digit| {
            n.saturating_mul(10).saturating_add(i32::from(digit - b'0'))
        })
}
