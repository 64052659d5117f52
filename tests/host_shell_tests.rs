//! End-to-end navigation through the host shell

mod common;

use common::*;
use futures::future::join_all;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use remote_shell::module::api::{LogoutMessage, RegisterMessage};
use remote_shell::module::ShellMessage;
use remote_shell::router::{RouteDecision, RouteView, UnavailableReason};
use remote_shell::session::{FileSessionStorage, SessionPhase, SessionStorage};
use tempfile::TempDir;

#[tokio::test(start_paused = true)]
async fn test_booking_scenario_by_role() {
    let mut fixture = ShellFixture::new();
    fixture.serve_booking();
    assert_eq!(fixture.start().await, 2);

    let route = fixture.shell.navigate("/booking/list").await;
    assert!(matches!(
        route.view(),
        RouteView::AuthenticationRequired { login_path } if login_path == "/auth/login"
    ));
    assert!(route.mount().is_none());

    fixture.login("gus", "guest").await;
    let route = fixture.shell.navigate("/booking/list").await;
    assert!(matches!(route.view(), RouteView::AccessDenied));
    assert_eq!(route.markup(), "<div>Access Denied</div>");
    // Denied routes never touch the network
    assert_eq!(fixture.host.attached.load(Ordering::SeqCst), 0);

    fixture.login("mia", "member").await;
    let route = fixture.shell.navigate("/booking/list").await;
    assert!(route.view().is_module());
    assert_eq!(route.markup(), "<section>booking list</section>");

    fixture.login("root", "admin").await;
    let route = fixture.shell.navigate("/booking/list").await;
    assert!(matches!(route.decision(), RouteDecision::Allow(_)));
    assert!(route.view().is_module());
}

#[tokio::test(start_paused = true)]
async fn test_checking_before_session_restore() {
    let fixture = ShellFixture::new();
    let auth = TestContainer::with_exports(&[("./Login", "login form")]);
    fixture
        .host
        .serve("https://auth/remoteEntry.js", "auth", auth);
    let loaded = fixture
        .shell
        .manifest()
        .load(&InlineManifest(Some(BOOKING_MANIFEST.to_string())))
        .await;
    assert_eq!(loaded, 2);
    assert_eq!(fixture.shell.session().phase(), SessionPhase::Checking);

    let route = fixture.shell.navigate("/booking/list").await;
    assert!(matches!(route.view(), RouteView::Checking));
    assert!(route.mount().is_none());

    let login = fixture.shell.navigate("/auth/login").await;
    assert!(matches!(login.decision(), RouteDecision::AllowAuthPath(_)));
    assert_eq!(login.markup(), "<section>login form</section>");

    assert!(matches!(
        fixture.shell.navigate("/").await.view(),
        RouteView::Home
    ));
}

#[tokio::test(start_paused = true)]
async fn test_published_login_is_seen_by_next_navigation() {
    let mut fixture = ShellFixture::new();
    fixture.serve_booking();
    fixture.start().await;

    fixture.shell.bus().publish(login_message("mia", "member"));
    let route = fixture.shell.navigate("/booking/list").await;
    assert_eq!(route.markup(), "<section>booking list</section>");

    fixture.shell.bus().publish(login_message("gus", "guest"));
    assert_eq!(
        fixture.shell.decide("/booking/list").await,
        RouteDecision::Deny
    );
}

#[tokio::test(start_paused = true)]
async fn test_published_registration_is_seen_by_next_decision() {
    let mut fixture = ShellFixture::new();
    fixture.start().await;
    fixture.login("ann", "analyst").await;

    fixture.shell.bus().publish(register_message(
        "reporting",
        "https://reports/remoteEntry.js",
        "Dashboard",
        "/reporting/dashboard",
    ));
    assert!(matches!(
        fixture.shell.decide("/reporting/dashboard").await,
        RouteDecision::Allow(entry) if entry.scope == "reporting"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_messages_beyond_bus_capacity_are_all_applied() {
    let mut fixture = ShellFixture::new();
    fixture.start().await;
    fixture.login("root", "admin").await;
    let mut observer = fixture.shell.bus().subscribe();

    let burst = fixture.shell.config().bus_capacity + 1;
    for i in 0..burst {
        fixture.shell.bus().publish(register_message(
            &format!("m{}", i),
            &format!("https://m{}/remoteEntry.js", i),
            "Page",
            &format!("/m{}", i),
        ));
    }

    assert!(matches!(
        fixture.shell.decide("/m0").await,
        RouteDecision::Allow(entry) if entry.scope == "m0"
    ));
    assert_eq!(fixture.shell.manifest().len().await, 2 + burst);
    // Observers may lag; the shell itself does not
    assert!(observer.recv().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_messages_published_before_start_are_applied_after_restore() {
    let mut fixture = ShellFixture::new();
    fixture.serve_booking();
    fixture.shell.bus().publish(login_message("mia", "member"));

    fixture.start().await;
    assert_eq!(
        fixture.shell.navigate("/booking/list").await.markup(),
        "<section>booking list</section>"
    );
}

#[tokio::test(start_paused = true)]
async fn test_unknown_path_is_not_found() {
    let mut fixture = ShellFixture::new();
    fixture.start().await;
    fixture.login("mia", "member").await;

    let route = fixture.shell.navigate("/reporting/dashboard").await;
    assert!(matches!(route.view(), RouteView::NotFound));
    assert_eq!(route.markup(), "<div>404 - Module Not Found</div>");
}

#[tokio::test(start_paused = true)]
async fn test_login_route_renders_while_signed_out() {
    let mut fixture = ShellFixture::new();
    let auth = TestContainer::with_exports(&[("./Login", "login form"), ("./Profile", "profile")]);
    fixture
        .host
        .serve("https://auth/remoteEntry.js", "auth", auth);
    fixture.start().await;

    let route = fixture.shell.navigate("/auth/login").await;
    assert!(matches!(route.decision(), RouteDecision::AllowAuthPath(_)));
    assert_eq!(route.markup(), "<section>login form</section>");

    // Other auth routes still need a session
    let route = fixture.shell.navigate("/auth/profile").await;
    assert!(matches!(route.decision(), RouteDecision::RequireAuth { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_script_failure_is_isolated_to_its_route() {
    let mut fixture = ShellFixture::new();
    fixture.serve_booking();
    fixture
        .host
        .on("https://auth/remoteEntry.js", ScriptBehavior::Fail);
    fixture.start().await;
    fixture.login("mia", "member").await;

    let broken = fixture.shell.navigate("/auth/profile").await;
    assert!(matches!(
        broken.view(),
        RouteView::ModuleUnavailable(UnavailableReason::ScriptFailed { url })
            if url == "https://auth/remoteEntry.js"
    ));
    assert!(broken.mount().is_some_and(|m| m.is_failed()));

    let working = fixture.shell.navigate("/booking/list").await;
    assert_eq!(working.markup(), "<section>booking list</section>");
}

#[tokio::test(start_paused = true)]
async fn test_missing_container_reports_attempts() {
    let mut fixture = ShellFixture::new();
    fixture
        .host
        .on("https://x/remoteEntry.js", ScriptBehavior::LoadWithoutContainer);
    fixture.start().await;
    fixture.login("mia", "member").await;

    let started = Instant::now();
    let route = fixture.shell.navigate("/booking/list").await;
    let elapsed = started.elapsed();

    match route.view() {
        RouteView::ModuleUnavailable(UnavailableReason::ContainerMissing { scope, attempts }) => {
            assert_eq!(scope, "booking");
            assert_eq!(*attempts, 10);
        }
        other => panic!("expected missing container, got {:?}", other),
    }
    // Settle delay plus the full poll
    assert!(elapsed >= Duration::from_millis(1100));
    assert!(route.markup().contains("Module unavailable"));
}

#[tokio::test(start_paused = true)]
async fn test_late_container_is_found_by_polling() {
    let mut fixture = ShellFixture::new();
    let container = TestContainer::with_exports(&[("./List", "late list")]);
    fixture.host.on(
        "https://x/remoteEntry.js",
        ScriptBehavior::Load {
            scope: "booking".to_string(),
            container: container.clone(),
            register_after: Duration::from_millis(350),
        },
    );
    fixture.start().await;
    fixture.login("mia", "member").await;

    let route = fixture.shell.navigate("/booking/list").await;
    assert_eq!(route.markup(), "<section>late list</section>");
    assert_eq!(container.inits.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_missing_export_is_a_resolution_failure() {
    let mut fixture = ShellFixture::new();
    let container = TestContainer::with_exports(&[("./Other", "other")]);
    fixture
        .host
        .serve("https://x/remoteEntry.js", "booking", container);
    fixture.start().await;
    fixture.login("mia", "member").await;

    let route = fixture.shell.navigate("/booking/list").await;
    assert!(matches!(
        route.view(),
        RouteView::ModuleUnavailable(UnavailableReason::ResolutionFailed { scope, .. })
            if scope == "booking"
    ));
}

#[tokio::test(start_paused = true)]
async fn test_runtime_registration_is_routable_without_restart() {
    let mut fixture = ShellFixture::new();
    let reports = TestContainer::with_exports(&[("./Dashboard", "dashboard")]);
    fixture
        .host
        .serve("https://reports/remoteEntry.js", "reporting", reports);
    fixture.start().await;
    fixture.login("ann", "analyst").await;

    assert!(matches!(
        fixture.shell.decide("/reporting/dashboard").await,
        RouteDecision::NotFound
    ));

    fixture
        .shell
        .bus()
        .publish(ShellMessage::Register(RegisterMessage {
            name: "reporting".to_string(),
            url: "https://reports/remoteEntry.js".to_string(),
            components: vec!["Dashboard".to_string()],
            routes: vec!["/reporting/dashboard".to_string()],
            permissions: vec!["analyst".to_string()],
        }));
    let route = fixture.shell.navigate("/reporting/dashboard").await;
    assert_eq!(route.markup(), "<section>dashboard</section>");
}

#[tokio::test(start_paused = true)]
async fn test_missing_manifest_still_accepts_registrations() {
    let mut fixture = ShellFixture::new();
    let loaded = fixture.shell.start(&InlineManifest(None)).await;
    assert_eq!(loaded, 0);
    assert!(fixture.shell.manifest().is_empty().await);

    fixture.login("root", "admin").await;
    assert!(matches!(
        fixture.shell.navigate("/booking/list").await.view(),
        RouteView::NotFound
    ));
    assert!(matches!(
        fixture.shell.navigate("/").await.view(),
        RouteView::Home
    ));
}

#[tokio::test(start_paused = true)]
async fn test_logout_returns_to_root_and_erases_session() {
    let mut fixture = ShellFixture::new();
    fixture.serve_booking();
    fixture.start().await;
    fixture.login("mia", "member").await;
    fixture.navigator.navigate("/booking/list");
    assert!(fixture.storage.read("session").unwrap().is_some());

    fixture
        .shell
        .dispatch(ShellMessage::Logout(LogoutMessage {}))
        .await;

    assert_eq!(fixture.shell.session().phase(), SessionPhase::Unauthenticated);
    assert_eq!(fixture.navigator.location(), "/");
    assert_eq!(fixture.navigator.hard_navigations(), 1);
    assert!(fixture.storage.read("session").unwrap().is_none());
    assert!(matches!(
        fixture.shell.navigate("/booking/list").await.view(),
        RouteView::AuthenticationRequired { .. }
    ));
}

#[tokio::test(start_paused = true)]
async fn test_session_survives_reload() {
    let dir = TempDir::new().unwrap();

    let mut first = ShellFixture::with_storage(Arc::new(FileSessionStorage::new(dir.path())));
    first.start().await;
    first.login("mia", "member").await;
    drop(first);

    let mut second = ShellFixture::with_storage(Arc::new(FileSessionStorage::new(dir.path())));
    second.serve_booking();
    second.start().await;

    let session = second.shell.session().current().unwrap();
    assert_eq!(session.username, "mia");
    assert_eq!(session.role, "member");
    assert_eq!(
        second.shell.navigate("/booking/list").await.markup(),
        "<section>booking list</section>"
    );
}

#[tokio::test(start_paused = true)]
async fn test_corrupt_session_starts_signed_out() {
    let dir = TempDir::new().unwrap();
    let storage = Arc::new(FileSessionStorage::new(dir.path()));
    storage.write("session", "{not json").unwrap();

    let mut fixture = ShellFixture::with_storage(storage.clone());
    fixture.start().await;

    assert_eq!(fixture.shell.session().phase(), SessionPhase::Unauthenticated);
    assert!(storage.read("session").unwrap().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_unmount_detaches_script_but_keeps_container() {
    let mut fixture = ShellFixture::new();
    fixture.serve_booking();
    fixture.start().await;
    fixture.login("mia", "member").await;

    let route = fixture.shell.navigate("/booking/list").await;
    assert_eq!(fixture.host.live_elements(), 1);
    route.unmount();
    assert_eq!(fixture.host.live_elements(), 0);
    assert!(fixture.registry.contains("booking"));

    // Remounting attaches a fresh element and resolves again
    let again = fixture.shell.navigate("/booking/list").await;
    assert!(again.view().is_module());
    assert_eq!(fixture.host.attached.load(Ordering::SeqCst), 2);
    drop(again);
    assert_eq!(fixture.host.live_elements(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_navigations_resolve_independently() {
    let mut fixture = ShellFixture::new();
    let booking = fixture.serve_booking();
    let auth = TestContainer::with_exports(&[("./Profile", "profile")]);
    fixture
        .host
        .serve("https://auth/remoteEntry.js", "auth", auth.clone());
    fixture.start().await;
    fixture.login("root", "admin").await;

    let paths = ["/booking/list", "/auth/profile", "/booking/list"];
    let routes = join_all(paths.iter().map(|path| fixture.shell.navigate(path))).await;
    assert_eq!(routes[0].markup(), "<section>booking list</section>");
    assert_eq!(routes[1].markup(), "<section>profile</section>");
    assert_eq!(routes[2].markup(), "<section>booking list</section>");
    assert_eq!(fixture.host.live_elements(), 3);

    // Nothing is cached: each navigation initializes its container again
    assert_eq!(booking.inits.load(Ordering::SeqCst), 2);
    assert_eq!(auth.inits.load(Ordering::SeqCst), 1);
}

struct ExplodingContainer;

#[async_trait::async_trait]
impl remote_shell::module::RemoteContainer for ExplodingContainer {
    async fn init(&self, _shared: &remote_shell::module::SharedScope) -> anyhow::Result<()> {
        panic!("remote init blew up");
    }

    async fn get(&self, _export_name: &str) -> anyhow::Result<remote_shell::module::ModuleFactory> {
        anyhow::bail!("unreachable after init")
    }
}

#[tokio::test(start_paused = true)]
async fn test_panicking_remote_init_only_breaks_its_route() {
    let mut fixture = ShellFixture::new();
    fixture
        .host
        .serve("https://x/remoteEntry.js", "booking", Arc::new(ExplodingContainer));
    let auth = TestContainer::with_exports(&[("./Profile", "profile")]);
    fixture
        .host
        .serve("https://auth/remoteEntry.js", "auth", auth);
    fixture.start().await;
    fixture.login("mia", "member").await;

    let broken = fixture.shell.navigate("/booking/list").await;
    match broken.view() {
        RouteView::ModuleUnavailable(UnavailableReason::ResolutionFailed { scope, reason }) => {
            assert_eq!(scope, "booking");
            assert!(reason.contains("remote init blew up"));
        }
        other => panic!("expected resolution failure, got {:?}", other),
    }

    let working = fixture.shell.navigate("/auth/profile").await;
    assert_eq!(working.markup(), "<section>profile</section>");
    assert!(matches!(
        fixture.shell.navigate("/").await.view(),
        RouteView::Home
    ));
}
