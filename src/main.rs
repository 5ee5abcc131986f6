use qlab_sim::{Circuit, Simulator, SimulatorConfig};
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn print_result(name: &str, circuit: &Circuit, sim: &Simulator) {
    let result = match sim.run(circuit) {
        Ok(result) => result,
        Err(e) => {
            error!("{name}: {e}");
            return;
        }
    };
    println!("{name} ({} qubits, {} gates)", circuit.qubits, circuit.gates.len());
    for o in result.outcomes(sim.config().outcome_threshold) {
        println!("  {:>8}  p = {:.4}  |a| = {:.4}", o.label, o.probability, o.amplitude);
    }
    for (q, m) in result.qubit_marginals.iter().enumerate() {
        let (p0, p1) = m.percentages();
        println!("  q{q}: {:>12}  P(0) = {p0:5.1}%  P(1) = {p1:5.1}%", m.label().to_string());
    }
    println!();
}

fn main() -> qlab_sim::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "qlab_sim=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!("qlab-sim - Quantum Circuit Simulator\n");

    // Demo
    let sim = Simulator::default();
    let bell = Circuit::new(2, 2)
        .h(0, 0)
        .cnot(0, 1, 1)?;
    print_result("Bell state", &bell, &sim);
    print_result("Quantum Entanglement", &Circuit::entanglement_demo(), &sim);

    let batch = vec![
        Circuit::new(1, 1).x(0, 0),
        Circuit::new(1, 2).h(0, 0).t(0, 1),
        Circuit::new(2, 1).swap(0, 1, 0)?,
    ];
    let ok = sim.run_batch(&batch).iter().filter(|r| r.is_ok()).count();
    info!("Batch of {} circuits: {} simulated", batch.len(), ok);

    // Benchmark
    println!("\n--- Benchmark ---\n");

    for n in [10, 14, 16, 18, 20] {
        // H on qubit 0, then a CNOT chain -> GHZ state
        let t0 = Instant::now();
        let mut circuit = Circuit::new(n, n).h(0, 0);
        for i in 0..n - 1 {
            circuit = circuit.cnot(i, i + 1, i + 1)?;
        }
        let setup = t0.elapsed();

        let sim = Simulator::new(SimulatorConfig::benchmark(n));
        let t0 = Instant::now();
        let result = sim.run(&circuit);
        let gates = t0.elapsed();

        let total_amps = 1usize << n;
        match result {
            Ok(r) => println!(
                "{:2} qubits ({:>8} amps): setup {:>8.2?}, simulate {:>8.2?} (H + {} CNOTs, P(0...0) = {:.3})",
                n,
                total_amps,
                setup,
                gates,
                n - 1,
                r.probabilities[0],
            ),
            Err(e) => error!("{n} qubits: {e}"),
        }
    }
    Ok(())
}
