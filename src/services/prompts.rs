//! 提示词模板

/// 确定目标网站的提示词
pub fn target_site_prompt(query: &str) -> String {
    format!(
        r#"
Analyze this scraping request and determine the target website URL:
"{query}"

Based on the request, identify:
1. What type of data they want (products, articles, repositories, etc.)
2. The most appropriate website to scrape for this data
3. The specific URL that would contain this data

Common examples:
- "GitHub trending repositories" → "https://github.com/trending"
- "TechCrunch articles" → "https://techcrunch.com"
- "Hacker News posts" → "https://news.ycombinator.com"
- "Reddit posts from programming" → "https://reddit.com/r/programming"
- "Amazon products" → specific Amazon search/category URL
- "eBay listings" → specific eBay search/category URL

Respond with JSON only:
{{
    "url": "https://specific-website-url.com",
    "reasoning": "This URL contains the requested data type",
    "dataType": "repositories|articles|products|posts|etc"
}}
"#
    )
}

/// 第一次生成选择器：只有用户请求
pub fn initial_scheme_prompt(query: &str) -> String {
    format!(
        r#"
Parse this web scraping request and generate CSS selectors:
"{query}"

Analyze the request and determine:
1. What data elements need to be extracted
2. The most likely CSS selectors for those elements
3. How many items to extract

Respond with JSON only:
{{
    "elements": {{
        "name": "selector1, selector2, selector3",
        "price": "selector1, selector2, selector3",
        "rating": "selector1, selector2, selector3"
    }},
    "maxItems": 20,
    "containers": ["selector1", "selector2", "selector3"]
}}
"#
    )
}

/// 后续尝试：附带页面结构样本，并要求给出不同的选择器
pub fn retry_scheme_prompt(query: &str, page_sample: &str, attempt: usize) -> String {
    format!(
        r#"
PREVIOUS SELECTORS FAILED. Analyze this HTML content and generate NEW selectors:

Original request: "{query}"
HTML Sample: "{page_sample}"
Attempt: {attempt}

Carefully examine the HTML structure and identify:
1. Container elements that hold product/item data
2. Elements within containers that contain names/titles
3. Elements that contain prices/costs
4. Elements that contain ratings/reviews

E-commerce storefronts often use patterns like:
- Product names: h3 a, .product-title, .product-name, .card-title, .item-title
- Prices: .money, .price, .price-item, .product-price, span[class*="price"]
- Ratings: .rating, .stars, .review, [class*="star"], [class*="rating"]
- Containers: .product-item, .grid-item, .product-card, .collection-item

Generate completely DIFFERENT selectors from what might have been tried before.
Look for:
- Class names with product, item, card, listing in them
- Data attributes
- Specific HTML structures
- Alternative selector patterns
- Nested selectors like "div.container h3 a"

Respond with JSON only:
{{
    "elements": {{
        "name": "h3 a, .product-title a, [class*='title'] a, .card-title",
        "price": ".money, .price, [class*='price'], .cost, .amount",
        "rating": ".rating, .stars, [class*='rating'], [class*='star'], .review"
    }},
    "maxItems": 20,
    "containers": [".product-item", ".grid-item", ".product-card", ".collection-item"]
}}
"#
    )
}
