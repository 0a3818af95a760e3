use std::process::ExitCode;

fn main() -> ExitCode {
    cxx_build_driver::build::build_main()
}
