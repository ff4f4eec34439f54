//! The fixed catalog of services the agency writes about.

/// A service offered by the agency, with the topics rotated for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Service {
	pub id: &'static str,
	pub name: &'static str,
	/// Path of the service page, relative to the website root.
	pub path: &'static str,
	pub keywords: &'static str,
	pub topics: &'static [&'static str],
}

pub const CONTACT_PATH: &str = "/contact";

pub static SERVICES: &[Service] = &[
	Service {
		id: "seo",
		name: "Search Engine Optimization",
		path: "/services/seo",
		keywords: "SEO, local SEO, search rankings, Google visibility",
		topics: &[
			"Top SEO Agency in Guntur",
			"Best SEO Services in Guntur for Small Businesses",
			"Local SEO Checklist for Guntur Businesses",
			"How Long Does SEO Take to Show Results",
			"On-Page SEO Techniques That Still Work",
			"Why Google Business Profile Matters for Local Search",
		],
	},
	Service {
		id: "social-media-marketing",
		name: "Social Media Marketing",
		path: "/services/social-media-marketing",
		keywords: "social media marketing, Instagram, Facebook, engagement",
		topics: &[
			"Social Media Marketing Strategies for Guntur Brands",
			"Instagram Reels Ideas for Local Businesses",
			"How to Build a Content Calendar That Works",
			"Facebook vs Instagram: Where Should Your Business Post",
			"Measuring ROI from Social Media Campaigns",
		],
	},
	Service {
		id: "ppc-advertising",
		name: "PPC Advertising",
		path: "/services/ppc-advertising",
		keywords: "Google Ads, PPC, paid search, cost per click",
		topics: &[
			"Google Ads Tips for Small Budgets",
			"PPC vs SEO: Which Is Right for Your Business",
			"How to Lower Your Cost per Click",
			"Writing Ad Copy That Converts",
			"Remarketing Campaigns Explained",
		],
	},
	Service {
		id: "web-development",
		name: "Website Development",
		path: "/services/web-development",
		keywords: "website design, web development, responsive websites",
		topics: &[
			"Why Every Guntur Business Needs a Website",
			"Signs Your Website Needs a Redesign",
			"Website Speed and Its Impact on Sales",
			"Mobile-First Design for Local Businesses",
			"Choosing the Right Website Development Company in Guntur",
		],
	},
	Service {
		id: "content-marketing",
		name: "Content Marketing",
		path: "/services/content-marketing",
		keywords: "content marketing, blogging, storytelling, lead generation",
		topics: &[
			"How Blogging Drives Leads for Local Businesses",
			"Content Marketing Ideas for Service Businesses",
			"Repurposing Blog Posts for Social Media",
			"Writing for Search Engines and People",
		],
	},
	Service {
		id: "branding",
		name: "Branding and Design",
		path: "/services/branding",
		keywords: "branding, logo design, brand identity",
		topics: &[
			"Building a Memorable Brand in Guntur",
			"What Makes a Great Logo",
			"Brand Consistency Across Online Channels",
			"Rebranding: When and How to Do It",
		],
	},
];

/// Finds a service by its id.
pub fn find<'a>(services: &'a [Service], id: &str) -> Option<&'a Service> {
	services.iter().find(|s| s.id == id)
}

/// Builds a block of do-follow links to the agency's own pages: the given
/// service first, then every other service, then the contact page.
pub fn internal_links(services: &[Service], service: &Service, website_url: &str) -> String {
	let base = escape(website_url.trim_end_matches('/'));
	let mut html = String::from("<div class=\"internal-links\">\n<h3>Explore Our Services</h3>\n<ul>\n");

	for s in std::iter::once(service).chain(services.iter().filter(|s| s.id != service.id)) {
		html.push_str(&format!(
			"<li><a href=\"{base}{}\">{}</a></li>\n",
			s.path,
			escape(s.name)
		));
	}

	html.push_str(&format!(
		"<li><a href=\"{base}{CONTACT_PATH}\">Contact Us</a></li>\n</ul>\n</div>"
	));

	html
}

/// Escapes text for use inside HTML content and attribute values.
fn escape(text: &str) -> String {
	text.replace('&', "&amp;")
		.replace('<', "&lt;")
		.replace('>', "&gt;")
		.replace('"', "&quot;")
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_catalog_is_well_formed() {
		assert!(!SERVICES.is_empty());

		for service in SERVICES {
			assert!(!service.topics.is_empty(), "{} has no topics", service.id);
			assert!(service.path.starts_with('/'));
			assert_eq!(
				SERVICES.iter().filter(|s| s.id == service.id).count(),
				1,
				"duplicate id {}",
				service.id
			);
		}
	}

	#[test]
	fn test_find() {
		assert_eq!(find(SERVICES, "seo").map(|s| s.name), Some("Search Engine Optimization"));
		assert!(find(SERVICES, "knitting").is_none());
	}

	#[test]
	fn test_internal_links_order_and_follow() {
		let branding = find(SERVICES, "branding").unwrap();
		let html = internal_links(SERVICES, branding, "https://agency.example/");

		let first = html.find("/services/branding").unwrap();
		let seo = html.find("/services/seo").unwrap();
		let contact = html.find("/contact").unwrap();

		assert!(first < seo);
		assert!(seo < contact);
		assert!(html.contains("href=\"https://agency.example/services/seo\""));
		assert!(!html.contains("nofollow"));
		assert!(html.contains("Branding and Design"));
		assert_eq!(html.matches("<li>").count(), SERVICES.len() + 1);
	}
}
