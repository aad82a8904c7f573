use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::thread::{self, JoinHandle};

use trenchx::solver::HEALTH_PATH;
use trenchx::{
    Calculation, CalculationState, FieldSolver, HttpSolver, SolverError, SolverRequest,
    TrenchConfiguration,
};

/// Serve one canned HTTP response and hand back the request line and body.
fn serve_once(status: &str, body: &'static str) -> (String, JoinHandle<(String, String)>) {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let url = format!("http://{}", listener.local_addr().expect("local address"));
    let status = status.to_string();

    let handle = thread::spawn(move || {
        let (stream, _) = listener.accept().expect("accept connection");
        let mut reader = BufReader::new(stream);

        let mut request_line = String::new();
        reader.read_line(&mut request_line).expect("request line");
        let mut content_length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).expect("header line");
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().expect("numeric length");
                }
            }
        }
        let mut request_body = vec![0; content_length];
        reader.read_exact(&mut request_body).expect("request body");

        let mut stream = reader.into_inner();
        write!(
            stream,
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
        .expect("write response");

        (
            request_line.trim_end().to_string(),
            String::from_utf8(request_body).expect("utf-8 body"),
        )
    });

    (url, handle)
}

#[test]
fn posts_configuration_and_decodes_profiles() {
    let (url, server) = serve_once(
        "200 OK",
        r#"{"image":"","x_coords":[-1.0,0.0,1.0],"B_0m":[10.0,250.0,12.0],"B_1m":[4.0,90.0,5.0]}"#,
    );
    let solver = HttpSolver::new(format!("{url}/"));
    let config = TrenchConfiguration::default();

    let response = solver
        .calculate(&SolverRequest::from(&config))
        .expect("solver answers");
    assert_eq!(response.b_ground, vec![10.0, 250.0, 12.0]);

    let (request_line, body) = server.join().expect("server thread");
    assert_eq!(request_line, "POST /api/magnetic-field/calculate HTTP/1.1");
    let sent: serde_json::Value = serde_json::from_str(&body).expect("json request");
    assert_eq!(sent["circuits"], 2);
    assert_eq!(sent["trefoil"], false);
    assert_eq!(sent["xVal"], 15.0);
    assert_eq!(sent["icnirpLimit"], 200.0);
}

#[test]
fn server_errors_fail_the_calculation() {
    let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
    let solver = HttpSolver::new(url);
    let mut calculation = Calculation::new();

    let state = calculation.run(&solver, &TrenchConfiguration::default());
    server.join().expect("server thread");

    assert_eq!(state, CalculationState::Failed);
    assert!(matches!(calculation.last_error(), Some(SolverError::Status(500))));
    assert!(calculation.latest().is_none());
}

#[test]
fn malformed_bodies_are_decode_errors() {
    let (url, server) = serve_once("200 OK", r#"{"x_coords":[1.0]}"#);
    let result = HttpSolver::new(url).calculate(&SolverRequest::from(&TrenchConfiguration::default()));
    server.join().expect("server thread");
    assert!(matches!(result, Err(SolverError::Decode(_))));
}

#[test]
fn unreachable_solver_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind local port");
    let url = format!("http://{}", listener.local_addr().expect("local address"));
    drop(listener);

    let solver = HttpSolver::new(url);
    assert!(matches!(solver.health(), Err(SolverError::Transport(_))));
    assert_eq!(
        solver.endpoint(HEALTH_PATH),
        format!("{}{HEALTH_PATH}", solver.endpoint(""))
    );
}
