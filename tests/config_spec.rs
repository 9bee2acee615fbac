use clap::Parser;
use speculate2::speculate;

use partnership_dashboard::config::{RemoteArgs, ServeArgs};

#[derive(Parser)]
struct ServeCli {
    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Parser)]
struct RemoteCli {
    #[command(flatten)]
    remote: RemoteArgs,
}

speculate! {
    use dashboard_core::auth::DEFAULT_SECRET;
    use dashboard_core::ConcurrencyPolicy;

    describe "serve settings" {
        it "fills every default when no flags are given" {
            let args = ServeArgs::from_env().unwrap();
            assert_eq!(args.port, 3000);
            assert!(!args.auth.secure_cookies);
            assert_eq!(args.auth.password, std::env::var("APP_PASSWORD").ok());
            let secret = std::env::var("AUTH_SECRET").unwrap_or_else(|_| DEFAULT_SECRET.to_string());
            assert_eq!(args.auth.auth_secret, secret);
        }

        it "matches what an explicit serve with no flags parses to" {
            let parsed = ServeCli::try_parse_from(["pdash"]).unwrap().serve;
            let defaults = ServeArgs::from_env().unwrap();
            assert_eq!(parsed.port, defaults.port);
            assert_eq!(parsed.auth.auth_secret, defaults.auth.auth_secret);
            assert_eq!(parsed.auth.secure_cookies, defaults.auth.secure_cookies);
        }

        it "takes port and cookie flags" {
            let parsed = ServeCli::try_parse_from(["pdash", "-p", "8080", "--secure-cookies"])
                .unwrap()
                .serve;
            assert_eq!(parsed.port, 8080);
            assert!(parsed.auth.secure_cookies);
        }

        it "rejects a port that does not fit" {
            assert!(ServeCli::try_parse_from(["pdash", "--port", "70000"]).is_err());
        }
    }

    describe "remote settings" {
        it "turns on stale-write rejection" {
            let parsed = RemoteCli::try_parse_from(["pdash", "--server", "http://10.0.0.5:3000", "--reject-stale"])
                .unwrap()
                .remote;
            assert_eq!(parsed.server, "http://10.0.0.5:3000");
            assert_eq!(parsed.dashboard_config().concurrency, ConcurrencyPolicy::RejectStale);
        }

        it "lets the last write win unless asked otherwise" {
            let parsed = RemoteCli::try_parse_from(["pdash"]).unwrap().remote;
            assert_eq!(parsed.dashboard_config().concurrency, ConcurrencyPolicy::LastWriteWins);
        }
    }
}
