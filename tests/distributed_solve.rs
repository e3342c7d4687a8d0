//! End-to-end tests of the distributed Jacobi solve over in-process workers.
//!
//! A plain single-array Jacobi iteration is the reference: splitting the mesh
//! across workers must not change a single bit of the result, and with
//! enough iterations both must agree with the direct LU solve.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use approx::assert_abs_diff_eq;
use jacobi_ode::context::NoProgress;
use jacobi_ode::io::{assemble_curve, ResultWriter};
use jacobi_ode::parallel::{run_workers, SerialComm};
use jacobi_ode::solver::DirectSolver;
use jacobi_ode::{
    solve_worker, Comm, OdeError, OdeProblem, Phase, Side, SolveOptions, SolveStats, WorkerContext,
};
use rand::Rng;

const TIMEOUT: Duration = Duration::from_secs(30);

fn problem(n_steps: usize, n_iterations: usize) -> OdeProblem {
    let opts = SolveOptions::default().with_steps(n_steps).with_iterations(n_iterations);
    OdeProblem::from_options(&opts).unwrap()
}

/// Whole-mesh Jacobi iteration with the same arithmetic as the sweep.
fn sequential_jacobi(ode: &OdeProblem) -> Vec<f64> {
    let n = ode.n_steps;
    let h2 = ode.step * ode.step;
    let r: Vec<f64> = (0..n).map(|g| ode.r(ode.coordinate(g))).collect();
    let f: Vec<f64> = (0..n).map(|g| ode.f(ode.coordinate(g))).collect();
    let mut u = vec![0.0; n + 2];
    let mut v = vec![0.0; n + 2];
    for _ in 0..ode.n_iterations {
        for i in 1..=n {
            v[i] = (u[i - 1] + u[i + 1] - h2 * f[i - 1]) / (2.0 - h2 * r[i - 1]);
        }
        std::mem::swap(&mut u, &mut v);
    }
    u[1..=n].to_vec()
}

/// Solve on `workers` channel-linked threads and concatenate in rank order.
fn distributed(ode: &OdeProblem, workers: usize) -> (Vec<f64>, Vec<SolveStats<f64>>) {
    let results = run_workers(workers, Some(TIMEOUT), |comm| {
        solve_worker(&comm, ode.clone(), &mut NoProgress)
    })
    .unwrap();
    let mut values = Vec::new();
    let mut stats = Vec::new();
    for (v, s) in results {
        values.extend(v);
        stats.push(s);
    }
    (values, stats)
}

#[test]
fn single_worker_matches_sequential_iteration() {
    let ode = problem(50, 400);
    let (values, stats) = solve_worker(&SerialComm, ode.clone(), &mut NoProgress).unwrap();
    assert_eq!(values, sequential_jacobi(&ode));
    assert_eq!(stats.iterations, 400);
}

#[test]
fn splitting_the_mesh_does_not_change_the_result() {
    let ode = problem(37, 300);
    let expected = sequential_jacobi(&ode);
    for workers in 2..=6 {
        let (values, _) = distributed(&ode, workers);
        assert_eq!(values, expected, "{workers} workers");
    }
}

#[test]
fn random_coefficients_are_split_invariant() {
    let mut rng = rand::thread_rng();
    for _ in 0..5 {
        let a: f64 = rng.gen_range(-2.0..0.0);
        let b: f64 = rng.gen_range(1.0..20.0);
        let ode = OdeProblem::new(move |x: f64| a * x, move |x: f64| (b * x).sin(), 29, 150).unwrap();
        let workers = rng.gen_range(2..=5);
        let (values, _) = distributed(&ode, workers);
        assert_eq!(values, sequential_jacobi(&ode), "a = {a}, b = {b}, {workers} workers");
    }
}

#[test]
fn every_worker_reports_the_same_residual() {
    let ode = problem(40, 200);
    let (_, stats) = distributed(&ode, 4);
    for s in &stats {
        assert_eq!(s.iterations, 200);
        assert_eq!(s.final_residual, stats[0].final_residual);
    }
}

#[test]
fn runs_are_deterministic() {
    let ode = problem(64, 250);
    let (first, _) = distributed(&ode, 3);
    let (second, _) = distributed(&ode, 3);
    assert_eq!(first, second);
}

#[test]
fn many_workers_finish_without_deadlock() {
    let ode = problem(64, 50);
    for workers in 2..=8 {
        let results = run_workers(workers, Some(TIMEOUT), |comm| {
            solve_worker(&comm, ode.clone(), &mut NoProgress)
        });
        assert!(results.is_ok(), "{workers} workers: {:?}", results.err());
    }
}

#[test]
fn converges_to_the_direct_solution() {
    let ode = problem(10, 2000);
    let direct = DirectSolver::new().solve(&ode).unwrap();
    let (values, stats) = distributed(&ode, 3);
    assert_eq!(values.len(), direct.len());
    for (u, d) in values.iter().zip(&direct) {
        assert_abs_diff_eq!(*u, *d, epsilon = 1e-10);
    }
    assert!(stats[0].final_residual < 1e-12, "residual {}", stats[0].final_residual);
}

#[test]
fn more_workers_than_points() {
    let ode = problem(3, 20);
    let results = run_workers(5, Some(TIMEOUT), |comm| {
        solve_worker(&comm, ode.clone(), &mut NoProgress)
    })
    .unwrap();
    let lens: Vec<usize> = results.iter().map(|(v, _)| v.len()).collect();
    assert_eq!(lens, vec![1, 1, 1, 0, 0]);
    assert!(results.iter().flat_map(|(v, _)| v).all(|u| u.is_finite()));
}

/// Per-iteration snapshot of one worker: (left ghost, owned values, right ghost).
type Trace = Vec<(f64, Vec<f64>, f64)>;

fn trace_workers(ode: &OdeProblem, workers: usize) -> Vec<Trace> {
    run_workers(workers, Some(TIMEOUT), |comm| {
        let mut ctx = WorkerContext::for_comm(&comm, ode.clone())?;
        ctx.prime()?;
        let mut trace = Trace::new();
        for _ in 0..ode.n_iterations {
            ctx.step(&comm, &mut NoProgress)?;
            trace.push((ctx.ghost(Side::Left), ctx.halo().owned().to_vec(), ctx.ghost(Side::Right)));
        }
        assert_eq!(ctx.phase(), Phase::Iterating);
        assert_eq!(comm.size(), workers);
        Ok(trace)
    })
    .unwrap()
}

#[test]
fn ghosts_hold_the_neighbors_edge_values() {
    // 4 points over 2 workers: rank 0 owns 0..2, rank 1 owns 2..4
    let ode = problem(4, 6);
    let traces = trace_workers(&ode, 2);
    for it in 0..ode.n_iterations {
        let (_, left_owned, left_right_ghost) = &traces[0][it];
        let (right_left_ghost, right_owned, _) = &traces[1][it];
        assert_eq!(left_owned.len(), 2);
        assert_eq!(right_owned.len(), 2);
        assert_eq!(*left_right_ghost, right_owned[0], "iteration {it}");
        assert_eq!(*right_left_ghost, left_owned[1], "iteration {it}");
    }
}

#[test]
fn boundary_ghosts_stay_zero() {
    let ode = problem(17, 30);
    let traces = trace_workers(&ode, 3);
    for it in 0..ode.n_iterations {
        assert_eq!(traces[0][it].0, 0.0);
        assert_eq!(traces[2][it].2, 0.0);
    }
}

#[test]
fn written_files_reassemble_into_the_curve() {
    let dir = std::env::temp_dir().join(format!("jacobi-ode-it-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let prefix = dir.join("u").to_string_lossy().into_owned();

    let ode = problem(20, 500);
    let prefix_ref = prefix.as_str();
    run_workers(3, Some(TIMEOUT), |comm| {
        let writer = ResultWriter::create(prefix_ref, comm.rank())?;
        let (values, _) = solve_worker(&comm, ode.clone(), &mut NoProgress)?;
        writer.write(&values)
    })
    .unwrap();

    let curve = assemble_curve(&prefix, 3).unwrap();
    let expected = sequential_jacobi(&ode);
    assert_eq!(curve.len(), ode.n_steps + 2);
    assert_eq!(curve[0], (0.0, 0.0));
    assert_eq!(curve[ode.n_steps + 1], (1.0, 0.0));
    for (g, u) in expected.iter().enumerate() {
        let (x, v) = curve[g + 1];
        assert_abs_diff_eq!(x, ode.coordinate(g), epsilon = 1e-12);
        assert_abs_diff_eq!(v, *u, epsilon = 1e-6);
    }
}

/// Run `f` on a helper thread and fail the test if it does not finish in time.
fn within<T: Send + 'static>(limit: Duration, f: impl FnOnce() -> T + Send + 'static) -> T {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(f());
    });
    rx.recv_timeout(limit).expect("run did not return in time")
}

#[test]
fn one_failing_worker_fails_the_whole_run() {
    for failing in 0..5 {
        let res = within(Duration::from_secs(20), move || {
            let ode = problem(40, 1);
            run_workers(5, None, |comm| {
                if comm.rank() == failing {
                    return Err(OdeError::Runtime(format!("rank {failing} failed")));
                }
                solve_worker(&comm, ode.clone(), &mut NoProgress)
            })
            .map(|_| ())
        });
        assert!(res.is_err(), "rank {failing} failed but the run succeeded");
    }
}

#[test]
fn late_failure_after_iterating_fails_the_whole_run() {
    let res = within(Duration::from_secs(20), || {
        let ode = problem(40, 30);
        run_workers(4, None, |comm| {
            let mut ctx = WorkerContext::for_comm(&comm, ode.clone())?;
            ctx.prime()?;
            for i in 0..ode.n_iterations {
                if comm.rank() == 3 && i == 10 {
                    return Err(OdeError::Runtime("rank 3 failed mid-run".into()));
                }
                ctx.step(&comm, &mut NoProgress)?;
            }
            ctx.finish(&comm).map(|_| ())
        })
    });
    assert!(res.is_err());
}
