//! Client address extraction with an explicit proxy trust boundary.
//!
//! Forwarding headers are attacker-controlled unless the request came through a proxy the
//! deployment trusts. [`ClientIpPolicy`] only honors them when the socket peer is listed in
//! `trusted_proxies`, and walks `X-Forwarded-For` from the right so a client cannot prepend a
//! forged address.

// self
use crate::_prelude::*;

/// Rules for deriving the client address used as a rate-limit key.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClientIpPolicy {
	/// Whether forwarding headers are considered at all.
	pub trust_forwarded: bool,
	/// Proxies whose forwarding headers are believed.
	pub trusted_proxies: Vec<IpAddr>,
}
impl ClientIpPolicy {
	/// Policy that ignores forwarding headers and always uses the socket peer.
	pub fn peer_only() -> Self {
		Self::default()
	}

	/// Policy that believes forwarding headers set by `proxies`.
	pub fn behind<I>(proxies: I) -> Self
	where
		I: IntoIterator<Item = IpAddr>,
	{
		Self { trust_forwarded: true, trusted_proxies: proxies.into_iter().collect() }
	}

	/// Returns `true` when `addr` is a trusted proxy.
	pub fn is_trusted(&self, addr: IpAddr) -> bool {
		self.trusted_proxies.contains(&addr)
	}

	/// Resolves the client address.
	///
	/// `forwarded_for` is the raw `X-Forwarded-For` value and `real_ip` the raw `X-Real-IP`
	/// value, if the request carried them. Falls back to `peer` whenever the headers cannot be
	/// trusted or parsed.
	pub fn resolve(
		&self,
		peer: IpAddr,
		forwarded_for: Option<&str>,
		real_ip: Option<&str>,
	) -> IpAddr {
		if !self.trust_forwarded || !self.is_trusted(peer) {
			return peer;
		}

		if let Some(chain) = forwarded_for.filter(|value| !value.trim().is_empty()) {
			return self.walk_forwarded(peer, chain);
		}

		real_ip.and_then(parse_hop).unwrap_or(peer)
	}

	fn walk_forwarded(&self, peer: IpAddr, chain: &str) -> IpAddr {
		let mut client = peer;

		for hop in chain.rsplit(',') {
			let Some(addr) = parse_hop(hop) else {
				return client;
			};

			client = addr;

			if !self.is_trusted(addr) {
				break;
			}
		}

		client
	}
}

fn parse_hop(raw: &str) -> Option<IpAddr> {
	let hop = raw.trim();

	hop.parse()
		.ok()
		.or_else(|| hop.parse::<std::net::SocketAddr>().ok().map(|socket| socket.ip()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn ip(raw: &str) -> IpAddr {
		raw.parse().expect("IP fixture should parse.")
	}

	#[test]
	fn peer_only_ignores_headers() {
		let policy = ClientIpPolicy::peer_only();

		assert_eq!(
			policy.resolve(ip("10.0.0.2"), Some("198.51.100.7"), Some("198.51.100.8")),
			ip("10.0.0.2")
		);
	}

	#[test]
	fn untrusted_peer_cannot_forge_headers() {
		let policy = ClientIpPolicy::behind([ip("10.0.0.1")]);

		assert_eq!(policy.resolve(ip("203.0.113.5"), Some("1.2.3.4"), None), ip("203.0.113.5"));
	}

	#[test]
	fn forwarded_chain_is_walked_from_the_right() {
		let policy = ClientIpPolicy::behind([ip("10.0.0.1"), ip("10.0.0.2")]);
		let resolved =
			policy.resolve(ip("10.0.0.1"), Some("6.6.6.6, 198.51.100.7, 10.0.0.2"), None);

		assert_eq!(resolved, ip("198.51.100.7"), "Spoofed leftmost entry must be ignored.");
	}

	#[test]
	fn garbage_hops_stop_the_walk() {
		let policy = ClientIpPolicy::behind([ip("10.0.0.1")]);

		assert_eq!(policy.resolve(ip("10.0.0.1"), Some("unknown"), None), ip("10.0.0.1"));
		assert_eq!(
			policy.resolve(ip("10.0.0.1"), Some("unknown, 198.51.100.7"), None),
			ip("198.51.100.7")
		);
	}

	#[test]
	fn real_ip_and_ports_are_supported() {
		let policy = ClientIpPolicy::behind([ip("10.0.0.1")]);

		assert_eq!(policy.resolve(ip("10.0.0.1"), None, Some("198.51.100.9")), ip("198.51.100.9"));
		assert_eq!(
			policy.resolve(ip("10.0.0.1"), Some("198.51.100.9:5123"), None),
			ip("198.51.100.9")
		);
		assert_eq!(
			policy.resolve(ip("10.0.0.1"), Some("[2001:db8::1]:443"), None),
			ip("2001:db8::1")
		);
	}
}
