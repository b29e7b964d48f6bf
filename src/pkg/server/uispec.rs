use std::collections::HashMap;

use askama::Template;

use crate::pkg::internal::{
    backend::{Application, Posting},
    date,
    filter::{
        Filter, HITS_MAX, HITS_MIN, PageDescriptor, PageDirection, STATUSES, change_hits,
        change_page,
    },
    logos::LogoClient,
    session::{Notice, StatusUpdate},
};

#[derive(Template)]
#[template(path = "home.html")]
pub struct Home<'a> {
    pub service_name: &'a str,
    pub login_url: &'a str,
    pub signed_in: bool,
}

pub struct StatusOption {
    pub name: &'static str,
    pub selected: bool,
}

pub fn status_options(selected: &str) -> Vec<StatusOption> {
    STATUSES
        .iter()
        .map(|&name| StatusOption {
            name,
            selected: name == selected,
        })
        .collect()
}

pub struct ApplicationCard {
    pub id: String,
    pub role: String,
    pub company: String,
    pub location: String,
    pub status: String,
    pub link: String,
    pub logo: String,
    pub applied: String,
    pub applied_input: String,
    pub status_options: Vec<StatusOption>,
}

impl ApplicationCard {
    pub fn new(app: Application, logos: &LogoClient, found: &HashMap<String, String>) -> Self {
        ApplicationCard {
            logo: logos.pick(found, &app.company).to_string(),
            applied: date::to_display_date(app.applied_date),
            applied_input: date::to_input_date(app.applied_date),
            status_options: status_options(&app.status),
            link: app.link.unwrap_or_default(),
            id: app.id,
            role: app.role,
            company: app.company,
            location: app.location,
            status: app.status,
        }
    }
}

pub struct PostingCard {
    pub title: String,
    pub company: String,
    pub locations: String,
    pub url: String,
    pub logo: String,
    pub posted: String,
    pub updated: String,
}

impl PostingCard {
    pub fn new(posting: Posting, logos: &LogoClient, found: &HashMap<String, String>) -> Self {
        PostingCard {
            logo: logos.pick(found, &posting.company).to_string(),
            posted: date::to_display_date(posting.date_posted),
            updated: date::to_display_datetime(posting.date_updated),
            locations: posting.locations.join(", "),
            title: posting.title,
            company: posting.company,
            url: posting.url,
        }
    }
}

pub struct PageLink {
    pub number: u32,
    pub href: String,
    pub current: bool,
}

/// Pagination hrefs for a list page, all derived from the current query.
pub struct Pager {
    pub page: PageDescriptor,
    pub prev: String,
    pub next: String,
    pub numbered: Vec<PageLink>,
    pub fewer: String,
    pub more: String,
}

impl Pager {
    const WINDOW: u32 = 2;

    pub fn new(path: &str, current: &str, page: PageDescriptor) -> Self {
        let href = |direction| format!("{}?{}", path, change_page(current, direction));
        let shown = page.display_number();
        let first = shown.saturating_sub(Self::WINDOW).max(1);
        let last = shown.saturating_add(Self::WINDOW).min(page.display_total());
        Pager {
            prev: href(PageDirection::Prev),
            next: href(PageDirection::Next),
            numbered: (first..=last)
                .map(|number| PageLink {
                    number,
                    href: href(PageDirection::Page(number)),
                    current: number == shown,
                })
                .collect(),
            fewer: format!("{}?{}", path, change_hits(current, HITS_MIN)),
            more: format!("{}?{}", path, change_hits(current, HITS_MAX)),
            page,
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct Dashboard<'a> {
    pub service_name: &'a str,
    pub applications: Vec<ApplicationCard>,
    pub filter: Filter,
    pub status_options: Vec<StatusOption>,
    pub current: String,
    pub pager: Pager,
    pub grid: bool,
    pub undo: Option<StatusUpdate>,
    pub notice: Option<Notice>,
    pub today: String,
}

#[derive(Template)]
#[template(path = "postings.html")]
pub struct Postings<'a> {
    pub service_name: &'a str,
    pub postings: Vec<PostingCard>,
    pub filter: Filter,
    pub current: String,
    pub pager: Pager,
    pub grid: bool,
}

#[derive(Template)]
#[template(path = "profile.html")]
pub struct Profile<'a> {
    pub service_name: &'a str,
    pub email: &'a str,
    pub applications_count: i64,
    pub notice: Option<Notice>,
}
