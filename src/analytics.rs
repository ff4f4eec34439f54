//! Aggregations over recorded post views.

use std::collections::HashMap;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use crate::{
	model::PostView,
	store::{self, PostStore, Store, ViewStore},
};

pub const DEFAULT_DAYS: u32 = 30;
pub const MAX_DAYS: u32 = 365;
pub const TOP_POSTS: usize = 10;

const SEARCH_ENGINES: &[&str] = &[
	"google",
	"bing",
	"yahoo",
	"duckduckgo",
	"baidu",
	"yandex",
	"ecosia",
];

const SOCIAL_NETWORKS: &[&str] = &[
	"facebook",
	"instagram",
	"twitter",
	"linkedin",
	"pinterest",
	"youtube",
	"reddit",
	"whatsapp",
	"tiktok",
];

/// Short-link hosts that do not carry the network's name.
const SOCIAL_HOSTS: &[&str] = &["t.co", "x.com", "fb.com", "lnkd.in", "wa.me"];

/// Where a view came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum Source {
	Direct,
	Search,
	Social,
	Referral,
}

impl Source {
	pub const ALL: [Self; 4] = [Self::Direct, Self::Search, Self::Social, Self::Referral];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, JsonSchema)]
pub enum Device {
	Mobile,
	Tablet,
	Desktop,
}

impl Device {
	pub const ALL: [Self; 3] = [Self::Mobile, Self::Tablet, Self::Desktop];
}

/// Extracts the lowercase host from a referrer URL.
fn host(referrer: &str) -> String {
	let rest = referrer
		.split_once("://")
		.map_or(referrer, |(_, rest)| rest);
	let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
	let host = authority.rsplit('@').next().unwrap_or_default();
	let host = host.split(':').next().unwrap_or_default();

	host.trim_start_matches("www.").to_ascii_lowercase()
}

/// Buckets a referrer by matching its host against known search engines
/// and social networks.
pub fn classify_referrer(referrer: Option<&str>) -> Source {
	let Some(referrer) = referrer.map(str::trim).filter(|r| !r.is_empty()) else {
		return Source::Direct;
	};

	let host = host(referrer);
	let has_label = |names: &[&str]| host.split('.').any(|label| names.contains(&label));

	if has_label(SEARCH_ENGINES) {
		Source::Search
	} else if has_label(SOCIAL_NETWORKS) || SOCIAL_HOSTS.contains(&host.as_str()) {
		Source::Social
	} else {
		Source::Referral
	}
}

pub fn classify_device(user_agent: Option<&str>) -> Device {
	let agent = user_agent.unwrap_or_default().to_ascii_lowercase();

	if agent.contains("mobile") && !agent.contains("ipad") {
		Device::Mobile
	} else if agent.contains("ipad") || agent.contains("tablet") {
		Device::Tablet
	} else {
		Device::Desktop
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct DayCount {
	pub day: NaiveDate,
	pub views: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub struct Share<T> {
	pub name: T,
	pub views: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, JsonSchema)]
pub struct TopPost {
	pub post_id: Uuid,
	pub title: String,
	pub slug: String,
	pub views: usize,
}

#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Summary {
	pub days: u32,
	/// Views within the range.
	pub total: usize,
	/// One entry per calendar day, oldest first.
	pub daily: Vec<DayCount>,
	/// The same entries, latest first.
	pub latest_first: Vec<DayCount>,
	pub sources: Vec<Share<Source>>,
	pub devices: Vec<Share<Device>>,
	pub top_posts: Vec<TopPost>,
}

/// The instant the oldest day of a `days` long range ending on `today` starts.
pub fn range_start(today: NaiveDate, days: u32, offset: FixedOffset) -> DateTime<Utc> {
	let first = today - Duration::days(i64::from(days.max(1)) - 1);

	let midnight = first.and_time(NaiveTime::default());

	offset
		.from_local_datetime(&midnight)
		.single()
		.map_or_else(|| Utc.from_utc_datetime(&midnight), |start| start.with_timezone(&Utc))
}

/// Counts views per calendar day for the `days` days ending on `today`,
/// oldest first. Days without views are included with a count of zero,
/// and views outside the range are ignored.
pub fn bucket_by_day(
	views: &[PostView],
	today: NaiveDate,
	days: u32,
	offset: FixedOffset,
) -> Vec<DayCount> {
	let days = days.max(1);
	let first = today - Duration::days(i64::from(days) - 1);
	let mut daily = first
		.iter_days()
		.take(days as usize)
		.map(|day| DayCount { day, views: 0 })
		.collect::<Vec<_>>();

	for view in views {
		let day = view.viewed_at.with_timezone(&offset).date_naive();
		let index = (day - first).num_days();

		if let Some(count) = usize::try_from(index).ok().and_then(|i| daily.get_mut(i)) {
			count.views += 1;
		}
	}

	daily
}

fn shares<T: Copy + Eq + std::hash::Hash>(
	all: &[T],
	views: &[&PostView],
	classify: impl Fn(&PostView) -> T,
) -> Vec<Share<T>> {
	let mut counts = HashMap::<T, usize>::new();

	for view in views {
		*counts.entry(classify(*view)).or_default() += 1;
	}

	all.iter()
		.map(|&name| Share {
			name,
			views: counts.get(&name).copied().unwrap_or(0),
		})
		.collect()
}

/// Post ids ordered by descending view count, ties broken by id.
fn ranking(views: &[&PostView]) -> Vec<(Uuid, usize)> {
	let mut counts = HashMap::<Uuid, usize>::new();

	for view in views {
		*counts.entry(view.post_id).or_default() += 1;
	}

	let mut ranking = counts.into_iter().collect::<Vec<_>>();

	ranking.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
	ranking
}

/// Builds the analytics summary for the `days` days ending today in the
/// site's offset.
#[tracing::instrument(skip(store))]
pub async fn summary(
	store: &dyn Store,
	now: DateTime<Utc>,
	days: u32,
	offset: FixedOffset,
) -> Result<Summary, store::Error> {
	let days = days.clamp(1, MAX_DAYS);
	let today = now.with_timezone(&offset).date_naive();
	let views = store.views_since(range_start(today, days, offset)).await?;

	let daily = bucket_by_day(&views, today, days, offset);
	let first = daily.first().map(|d| d.day).unwrap_or(today);
	let in_range = views
		.iter()
		.filter(|v| {
			let day = v.viewed_at.with_timezone(&offset).date_naive();
			first <= day && day <= today
		})
		.collect::<Vec<_>>();

	let mut top_posts = Vec::with_capacity(TOP_POSTS);

	for (post_id, views) in ranking(&in_range) {
		if top_posts.len() == TOP_POSTS {
			break;
		}

		// Views of deleted posts are dropped with the post, but a post can
		// disappear between the two reads.
		if let Some(post) = store.get_post(post_id).await? {
			top_posts.push(TopPost {
				post_id,
				title: post.title,
				slug: post.slug,
				views,
			});
		}
	}

	Ok(Summary {
		days,
		total: in_range.len(),
		latest_first: daily.iter().rev().copied().collect(),
		daily,
		sources: shares(&Source::ALL, &in_range, |v| {
			classify_referrer(v.referrer.as_deref())
		}),
		devices: shares(&Device::ALL, &in_range, |v| {
			classify_device(v.user_agent.as_deref())
		}),
		top_posts,
	})
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::{
		model::{NewBlogPost, NewPostView},
		store::memory::MemoryStore,
	};

	fn ist() -> FixedOffset {
		FixedOffset::east_opt(330 * 60).unwrap()
	}

	fn view(at: DateTime<Utc>) -> PostView {
		PostView {
			id: Uuid::new_v4(),
			post_id: Uuid::nil(),
			viewed_at: at,
			referrer: None,
			user_agent: None,
		}
	}

	#[test]
	fn test_classify_referrer() {
		assert_eq!(classify_referrer(None), Source::Direct);
		assert_eq!(classify_referrer(Some("  ")), Source::Direct);
		assert_eq!(classify_referrer(Some("https://www.google.co.in/search?q=seo")), Source::Search);
		assert_eq!(classify_referrer(Some("https://duckduckgo.com/")), Source::Search);
		assert_eq!(classify_referrer(Some("https://l.facebook.com/l.php")), Source::Social);
		assert_eq!(classify_referrer(Some("https://t.co/abc")), Source::Social);
		assert_eq!(classify_referrer(Some("https://microsoft.com/")), Source::Referral);
		assert_eq!(classify_referrer(Some("https://blog.example.org/google-tips")), Source::Referral);
	}

	#[test]
	fn test_classify_device() {
		let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) Mobile/15E148";
		let ipad = "Mozilla/5.0 (iPad; CPU OS 17_0 like Mac OS X) Mobile/15E148";
		let tablet = "Mozilla/5.0 (Linux; Android 13; SM-X200 Tablet)";
		let desktop = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

		assert_eq!(classify_device(Some(iphone)), Device::Mobile);
		assert_eq!(classify_device(Some(ipad)), Device::Tablet);
		assert_eq!(classify_device(Some(tablet)), Device::Tablet);
		assert_eq!(classify_device(Some(desktop)), Device::Desktop);
		assert_eq!(classify_device(None), Device::Desktop);
	}

	#[test]
	fn test_bucket_by_day_uses_local_days() {
		let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
		let views = [
			// 2024-05-09 20:00 UTC is 2024-05-10 01:30 in IST.
			view(Utc.with_ymd_and_hms(2024, 5, 9, 20, 0, 0).unwrap()),
			view(Utc.with_ymd_and_hms(2024, 5, 9, 10, 0, 0).unwrap()),
			view(Utc.with_ymd_and_hms(2024, 5, 8, 10, 0, 0).unwrap()),
			// Outside the range.
			view(Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()),
		];

		let daily = bucket_by_day(&views, today, 3, ist());

		assert_eq!(
			daily.iter().map(|d| (d.day.to_string(), d.views)).collect::<Vec<_>>(),
			[
				("2024-05-08".to_string(), 1),
				("2024-05-09".to_string(), 1),
				("2024-05-10".to_string(), 1),
			]
		);
	}

	#[test]
	fn test_bucket_by_day_includes_empty_days() {
		let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
		let daily = bucket_by_day(&[], today, 30, ist());

		assert_eq!(daily.len(), 30);
		assert!(daily.iter().all(|d| d.views == 0));
		assert_eq!(daily.last().unwrap().day, today);
		assert!(daily.windows(2).all(|w| w[0].day < w[1].day));
	}

	#[test]
	fn test_range_start() {
		let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();

		assert_eq!(
			range_start(today, 1, ist()),
			Utc.with_ymd_and_hms(2024, 5, 9, 18, 30, 0).unwrap()
		);
		assert_eq!(
			range_start(today, 7, FixedOffset::east_opt(0).unwrap()),
			Utc.with_ymd_and_hms(2024, 5, 4, 0, 0, 0).unwrap()
		);
	}

	#[tokio::test]
	async fn test_summary() {
		let store = MemoryStore::new();
		let now = Utc.with_ymd_and_hms(2024, 5, 10, 6, 0, 0).unwrap();
		let mut ids = Vec::new();

		for title in ["Popular", "Quiet"] {
			let post = store
				.insert_post(&NewBlogPost {
					title: title.into(),
					slug: title.to_lowercase(),
					content: "<p>x</p>".into(),
					excerpt: String::new(),
					tags: Vec::new(),
					category: "SEO".into(),
					author: "Team".into(),
					cover_image: None,
				})
				.await
				.unwrap();

			ids.push(post.id);
		}

		let views = [
			(ids[0], Some("https://www.google.com/"), Some("iPhone Mobile")),
			(ids[0], Some("https://www.instagram.com/"), None),
			(ids[0], None, Some("iPad Mobile")),
			(ids[1], Some("https://partner.example/"), None),
		];

		for (post_id, referrer, user_agent) in views {
			store
				.record_view(&NewPostView {
					post_id,
					viewed_at: now - Duration::hours(1),
					referrer: referrer.map(String::from),
					user_agent: user_agent.map(String::from),
				})
				.await
				.unwrap();
		}

		// Older than the range.
		store
			.record_view(&NewPostView {
				post_id: ids[1],
				viewed_at: now - Duration::days(40),
				referrer: None,
				user_agent: None,
			})
			.await
			.unwrap();

		let summary = summary(&store, now, 7, ist()).await.unwrap();

		assert_eq!(summary.total, 4);
		assert_eq!(summary.daily.len(), 7);
		assert_eq!(summary.daily.iter().map(|d| d.views).sum::<usize>(), summary.total);
		assert_eq!(summary.latest_first[0], *summary.daily.last().unwrap());
		assert_eq!(summary.sources.iter().map(|s| s.views).sum::<usize>(), summary.total);
		assert_eq!(summary.devices.iter().map(|s| s.views).sum::<usize>(), summary.total);
		assert_eq!(
			summary.sources,
			[
				Share { name: Source::Direct, views: 1 },
				Share { name: Source::Search, views: 1 },
				Share { name: Source::Social, views: 1 },
				Share { name: Source::Referral, views: 1 },
			]
		);
		assert_eq!(
			summary.devices,
			[
				Share { name: Device::Mobile, views: 1 },
				Share { name: Device::Tablet, views: 1 },
				Share { name: Device::Desktop, views: 2 },
			]
		);
		assert_eq!(
			summary.top_posts.iter().map(|p| (p.title.as_str(), p.views)).collect::<Vec<_>>(),
			[("Popular", 3), ("Quiet", 1)]
		);
	}
}
