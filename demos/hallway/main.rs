use std::{error::Error, fs, path::Path, sync::atomic::AtomicBool, time::Duration};

use hallway::{
    algo::{solve, Algorithm, Solution},
    env::{states, Action},
    gym::{list_scenarios, Scenario},
    sim::{Session, SessionConfig},
};
use strum::IntoEnumIterator;

const GAMMA: f64 = 0.9;
const MAX_STEPS: usize = 50;

fn layout(scenario: &Scenario) -> String {
    states()
        .map(|state| {
            if state == scenario.goal_state {
                "[G]"
            } else if scenario.is_bonus(state) {
                "[+]"
            } else if scenario.is_hazard(state) {
                "[!]"
            } else {
                "[ ]"
            }
        })
        .collect()
}

fn print_solution(solution: &Solution) {
    for (state, decision) in solution.policy.iter() {
        let q = Action::iter()
            .filter_map(|a| solution.q_value(state, a).map(|q| format!("{a}={q:.3}")))
            .collect::<Vec<_>>()
            .join(" ");
        println!(
            "  s{state}: V={:>8.3} {:<8} {q}",
            solution.values[state],
            decision.to_string(),
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let path = Path::new("demos/hallway");
    fs::create_dir_all(path.join("out"))?;

    let mut wtr = csv::Writer::from_path(path.join("out/trajectories.csv"))?;
    wtr.write_record(["scenario", "step", "from", "action", "to", "reward", "moved"])?;

    for scenario in list_scenarios() {
        println!("{} {} - {}", scenario.icon, scenario.name, scenario.description);
        println!(" {}", layout(scenario));

        for algorithm in Algorithm::iter() {
            let solution = solve(scenario, GAMMA, algorithm)?;
            println!(
                " {algorithm} iteration: {} iterations, {:.3} ms{}",
                solution.iterations,
                solution.solve_duration_ms(),
                if solution.converged { "" } else { " (not converged)" },
            );
            print_solution(&solution);
        }

        let config = SessionConfig {
            gamma: GAMMA,
            tick_interval: Duration::ZERO,
            ..Default::default()
        };
        let mut session = Session::new(scenario, config)?;
        session.run_ticks(MAX_STEPS, &AtomicBool::new(false))?;

        for record in session.trajectory() {
            wtr.write_record(&[
                scenario.id.clone(),
                record.step.to_string(),
                record.from.to_string(),
                record.action.to_string(),
                record.to.to_string(),
                record.reward.to_string(),
                record.moved.to_string(),
            ])?;
        }

        if let Some(last) = session.trajectory().last() {
            println!(" last step: {} --{}--> {}", last.from, last.action, last.to);
        }

        let stats = session.stats();
        println!(
            " run: {} steps, total reward {}, stuck {} times, at goal: {}\n",
            stats.steps,
            stats.total_reward,
            stats.stuck_count,
            session.is_at_goal(),
        );
    }

    wtr.flush()?;

    Ok(())
}
