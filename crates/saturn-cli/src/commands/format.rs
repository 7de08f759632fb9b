use saturn_core::format_clock;

pub fn run(seconds: u64) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", format_clock(seconds));
    Ok(())
}
