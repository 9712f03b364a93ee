//! Basic example using the in-memory session cache

use salvo::prelude::*;
use salvo_server_session::{MemoryCache, SessionConfig, SessionDepotExt, SessionHandler};

#[handler]
async fn index(depot: &mut Depot) -> String {
    let session = depot.session_mut().expect("Session not found");

    // Get current view count
    let views: i32 = session.get("views").unwrap_or(0);

    // Increment view count; this marks the session for saving
    if let Err(e) = session.set("views", views + 1) {
        return format!("Could not update session: {}", e);
    }

    format!("Hello! You have viewed this page {} time(s).", views + 1)
}

#[handler]
async fn get_user(depot: &mut Depot) -> String {
    // Reading does not modify the session, so no cookie is sent back
    let session = depot.session().expect("Session not found");

    match session.get::<String>("user") {
        Some(user) => format!("Logged in as: {}", user),
        None => "Not logged in".to_string(),
    }
}

#[handler]
async fn set_user(req: &mut Request, depot: &mut Depot) -> String {
    let session = depot.session_mut().expect("Session not found");

    let username = req
        .query::<String>("name")
        .unwrap_or_else(|| "anonymous".to_string());

    match session.set("user", &username) {
        Ok(()) => format!("User set to: {}", username),
        Err(e) => format!("Could not update session: {}", e),
    }
}

#[handler]
async fn logout(depot: &mut Depot) -> &'static str {
    let session = depot.session_mut().expect("Session not found");
    session.remove("user");
    "Logged out successfully"
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = SessionConfig::new("your-super-secret-key-change-in-production")
        .with_cookie_name("sessionid")
        .with_max_age(60 * 60 * 1000) // 1 hour in the cache
        .with_cookie_path("/")
        .with_cookie_expires(60 * 60 * 1000);

    let session_handler =
        SessionHandler::new(MemoryCache::new(), config).expect("Invalid session configuration");

    let router = Router::new()
        .hoop(session_handler)
        .get(index)
        .push(Router::with_path("user").get(get_user))
        .push(Router::with_path("login").get(set_user))
        .push(Router::with_path("logout").get(logout));

    let acceptor = TcpListener::new("127.0.0.1:5800").bind().await;
    println!("Server running at http://127.0.0.1:5800");
    println!("Try these endpoints:");
    println!("  GET /           - View counter");
    println!("  GET /user       - Get current user");
    println!("  GET /login?name=alice - Set user");
    println!("  GET /logout     - Clear user");

    Server::new(acceptor).serve(router).await;
}
