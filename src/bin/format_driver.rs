use std::process::ExitCode;

fn main() -> ExitCode {
    cxx_build_driver::format::format_main()
}
