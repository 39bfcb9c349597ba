use pomobar_core::format_clock;

pub fn run(seconds: f64) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", format_clock(seconds));
    Ok(())
}
