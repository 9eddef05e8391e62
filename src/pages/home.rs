use leptos::prelude::*;

use crate::components::bubble_chart::BubbleChart;
use crate::components::postings_chart::PostingsChart;

/// Narrative copy, one entry per scroll step.
const STEPS: [&str; 5] = [
	"Each circle is a company that rescinded internship offers this spring, sized by headcount and grouped by industry.",
	"Internet & Software companies pulled more offers than any other industry.",
	"Travel-adjacent industries were hit hardest: aerospace, hotels, automotive and retail.",
	"Many of the companies rescinding offers are large employers.",
	"Split by size, large employers account for a surprising share of the rescinded offers.",
];

/// Default Home Page
#[component]
pub fn Home() -> impl IntoView {
	view! {
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>

			<article class="story">
				<header>
					<h1>"Rescinded Internships"</h1>
					<p class="subtitle">"Who pulled their offers, and how postings recovered."</p>
				</header>

				<section class="scrolly">
					<div class="sticky-chart">
						<BubbleChart />
					</div>
					<div class="steps">
						{STEPS
							.iter()
							.enumerate()
							.map(|(i, text)| {
								view! {
									<div class="step" data-step={i.to_string()}>
										<p>{*text}</p>
									</div>
								}
							})
							.collect_view()}
					</div>
				</section>

				<section class="postings">
					<h2>"Internship postings since March"</h2>
					<PostingsChart />
				</section>
			</article>
		</ErrorBoundary>
	}
}
