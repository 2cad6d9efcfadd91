use seqmc::prelude::*;

use std::f64::consts::PI;
use tracing_subscriber::EnvFilter;

/// Integrating the function sin(x)
/// from x=0 to x=pi
/// Which gives the result: 2
fn main() -> seqmc::Result<()> {
    // set RUST_LOG=seqmc=debug to follow the projections
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // sampling uniformly on [0, pi] has the density 1/pi, so the integrand is pi * sin(x)
    let sampler = Uniform::new(0.0, PI)?.sampler(StreamProvider::default().next_stream());
    let criterion = StoppingCriterion::new(ErrorTarget::Absolute(0.001), 0.99, 100, 10_000_000)?;

    let mut integration = Integration1D::builder()
        .function(|x: f64| PI * x.sin())
        .sampler(sampler)
        .criterion(criterion)
        .antithetic(true)
        .build()?;

    let report = integration.evaluate_with_callback(&SimpleCallback {})?;

    println!("\n{}", report);
    println!("{}", report.to_json()?);

    Ok(())
}
